//! Authentication handlers

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use shared::{deserialize_form_int, validate_required, NewUser, Operation, Role, User};

use crate::error::AppError;
use crate::middleware::{optional_context, CurrentUser, SESSION_COOKIE};
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_form_int")]
    pub student_id: Option<i64>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: User,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    validate_required("username", &body.username)?;
    validate_required("password", &body.password)?;

    let auth_service = AuthService::new(state.db.clone(), &state.config.auth);
    let session = auth_service.login(&body.username, &body.password).await?;

    let cookie = Cookie::build((SESSION_COOKIE, session.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: format!("Welcome, {}!", session.user.display_name),
            access_token: session.token,
            token_type: session.token_type,
            expires_in: session.expires_in,
            user: session.user,
        }),
    ))
}

/// Logout endpoint handler. Always succeeds and clears the session cookie.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<LogoutResponse>), AppError> {
    if let Some(ctx) = optional_context(&state, &headers).await {
        AuthService::new(state.db.clone(), &state.config.auth)
            .logout(ctx.session_id)
            .await?;
    }

    Ok((
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Json(LogoutResponse {
            message: "You have been logged out".to_string(),
        }),
    ))
}

/// Register user endpoint handler (administrators only)
pub async fn register(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    WithRejection(Json(body), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    ctx.authorize(Operation::RegisterUser)?;

    let role = body
        .role
        .parse::<Role>()
        .map_err(|_| AppError::validation("role", "Role must be admin, staff, teacher or student"))?;

    let auth_service = AuthService::new(state.db.clone(), &state.config.auth);
    let user = auth_service
        .register_user(NewUser {
            username: body.username,
            password: body.password,
            role,
            full_name: body.full_name,
            student_id: body.student_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: format!("User {} registered", user.username),
            user,
        }),
    ))
}
