//! Authentication service for user registration, login, and session management

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::{display_name, validate_username, NewUser, Role, User};
use uuid::Uuid;
use validator::Validate;

use crate::config::AuthConfig;
use crate::context::RequestContext;
use crate::db::Db;
use crate::error::{is_unique_violation, AppError, AppResult};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: Db,
    jwt_secret: String,
    session_expiry: i64,
    bcrypt_cost: u32,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub jti: String, // Session ID
    pub username: String,
    pub role: Role,
    pub display_name: String,
    pub exp: i64,
    pub iat: i64,
}

/// A freshly issued session
#[derive(Debug, Serialize)]
pub struct SessionToken {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(skip)]
    pub session_id: Uuid,
    pub user: User,
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    role: String,
    full_name: Option<String>,
    student_id: Option<i64>,
    student_first_name: Option<String>,
    student_last_name: Option<String>,
}

impl UserRow {
    fn into_user(self) -> AppResult<User> {
        let role = self
            .role
            .parse::<Role>()
            .map_err(|e| AppError::Internal(format!("Stored user {} has bad role: {}", self.id, e)))?;

        let student_name = match (&self.student_first_name, &self.student_last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            _ => None,
        };

        Ok(User {
            id: self.id,
            display_name: display_name(
                &self.username,
                self.full_name.as_deref(),
                student_name.as_deref(),
            ),
            username: self.username,
            role,
            full_name: self.full_name,
            student_id: self.student_id,
        })
    }
}

const USER_SELECT: &str = r#"
    SELECT u.id, u.username, u.password_hash, u.role, u.full_name, u.student_id,
           s.first_name AS student_first_name, s.last_name AS student_last_name
    FROM users u
    LEFT JOIN students s ON s.id = u.student_id
"#;

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: Db, config: &AuthConfig) -> Self {
        Self {
            db,
            jwt_secret: config.jwt_secret.clone(),
            session_expiry: config.session_expiry,
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    /// Register a new user account with a hashed password
    pub async fn register_user(&self, input: NewUser) -> AppResult<User> {
        let input = input.normalized();
        input.validate()?;
        validate_username(&input.username).map_err(|m| AppError::validation("username", m))?;

        if input.student_id.is_some() && input.role != Role::Student {
            return Err(AppError::validation(
                "student_id",
                "Only student accounts can be linked to a student record",
            ));
        }

        // Hash password
        let password_hash = hash(&input.password, self.bcrypt_cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        // One statement, so concurrent registrations never hold a read lock
        // while waiting to write. The UNIQUE index settles duplicate names.
        let user_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, password_hash, role, full_name, student_id)
            SELECT ?, ?, ?, ?, ?
            WHERE ? IS NULL OR EXISTS (SELECT 1 FROM students WHERE id = ?)
            RETURNING id
            "#,
        )
        .bind(&input.username)
        .bind(&password_hash)
        .bind(input.role.as_str())
        .bind(&input.full_name)
        .bind(input.student_id)
        .bind(input.student_id)
        .bind(input.student_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("username", format!("User '{}' already exists", input.username))
            } else {
                AppError::DatabaseError(e)
            }
        })?
        .ok_or_else(|| AppError::NotFound("Student".to_string()))?;

        tracing::info!(user_id, username = %input.username, role = %input.role, "Registered user");

        self.get_user(user_id).await
    }

    /// Verify a username and password.
    ///
    /// Unknown users and wrong passwords fail identically.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        let username = username.trim();

        let user = sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.username = ?", USER_SELECT))
            .bind(username)
            .fetch_optional(&self.db)
            .await?;

        let Some(user) = user else {
            tracing::info!(username, "Login failed: unknown user");
            return Err(AppError::InvalidCredentials);
        };

        // Verify password
        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            tracing::info!(username, "Login failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        user.into_user()
    }

    /// Authenticate and open a new session
    pub async fn login(&self, username: &str, password: &str) -> AppResult<SessionToken> {
        let user = self.authenticate(username, password).await?;

        let session_id = Uuid::new_v4();
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.session_expiry);

        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, issued_at, expires_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(session_id.to_string())
        .bind(user.id)
        .bind(now)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        let token = self.generate_token(&user, session_id, now, expires_at)?;

        tracing::info!(user_id = user.id, %session_id, "User logged in");

        Ok(SessionToken {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.session_expiry,
            session_id,
            user,
        })
    }

    /// Revoke a session so its token is no longer accepted
    pub async fn logout(&self, session_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE sessions SET revoked_at = ? WHERE id = ? AND revoked_at IS NULL")
            .bind(Utc::now())
            .bind(session_id.to_string())
            .execute(&self.db)
            .await?;

        tracing::info!(%session_id, "Session revoked");
        Ok(())
    }

    /// Validate a session token and return the caller's context.
    ///
    /// The token must carry a valid signature and the session it names
    /// must exist, belong to the token's user, be unexpired and unrevoked.
    pub async fn resolve_session(&self, token: &str) -> AppResult<RequestContext> {
        let claims = self.validate_token(token)?;

        let session_id = Uuid::parse_str(&claims.jti).map_err(|_| AppError::Unauthenticated)?;
        let user_id = claims.sub.parse::<i64>().map_err(|_| AppError::Unauthenticated)?;

        let session = sqlx::query_as::<_, (i64, DateTime<Utc>, Option<DateTime<Utc>>)>(
            "SELECT user_id, expires_at, revoked_at FROM sessions WHERE id = ?",
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.db)
        .await?;

        match session {
            Some((owner, expires_at, None)) if owner == user_id && expires_at > Utc::now() => {
                Ok(RequestContext {
                    session_id,
                    user_id,
                    username: claims.username,
                    role: claims.role,
                    display_name: claims.display_name,
                })
            }
            _ => Err(AppError::Unauthenticated),
        }
    }

    /// Validate token signature and expiry and return claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::debug!("Rejected session token: {}", e);
            AppError::Unauthenticated
        })?;

        Ok(token_data.claims)
    }

    /// Look up a user by id
    pub async fn get_user(&self, user_id: i64) -> AppResult<User> {
        sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.id = ?", USER_SELECT))
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?
            .into_user()
    }

    /// Sign a session token
    fn generate_token(
        &self,
        user: &User,
        session_id: Uuid,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<String> {
        let claims = Claims {
            sub: user.id.to_string(),
            jti: session_id.to_string(),
            username: user.username.clone(),
            role: user.role,
            display_name: user.display_name.clone(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }
}
