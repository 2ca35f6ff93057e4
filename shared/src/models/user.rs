//! User and role models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Access class of a user account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Staff,
    Teacher,
    Student,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Staff, Role::Teacher, Role::Student];

    /// Name stored in the `users.role` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    pub fn is_student(&self) -> bool {
        matches!(self, Role::Student)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(format!("{:?} is not a valid role", other)),
        }
    }
}

/// A user account as exposed to callers (never carries the credential)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub full_name: Option<String>,
    /// Linked student record, only set for student accounts
    pub student_id: Option<i64>,
    pub display_name: String,
}

/// Pick the name shown for a user: explicit full name, then linked
/// student name, then the login name.
pub fn display_name(username: &str, full_name: Option<&str>, student_name: Option<&str>) -> String {
    full_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .or_else(|| student_name.map(str::trim).filter(|n| !n.is_empty()))
        .unwrap_or(username)
        .to_string()
}

/// Input for registering a user account
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub role: Role,

    #[validate(length(max = 200, message = "Full name must be at most 200 characters"))]
    pub full_name: Option<String>,

    pub student_id: Option<i64>,
}

impl NewUser {
    /// Trim surrounding whitespace; blank full names become absent
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            full_name: self
                .full_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!(" Teacher ".parse::<Role>().unwrap(), Role::Teacher);
        assert!("principal".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_is_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Staff).unwrap(), "\"staff\"");
        assert_eq!(serde_json::from_str::<Role>("\"student\"").unwrap(), Role::Student);
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(display_name("ivan", Some("Ivan Petrov"), Some("Ivan P")), "Ivan Petrov");
        assert_eq!(display_name("ivan", Some("  "), Some("Ivan P")), "Ivan P");
        assert_eq!(display_name("ivan", None, None), "ivan");
    }

    #[test]
    fn test_new_user_validation() {
        let user = NewUser {
            username: "  teacher1 ".to_string(),
            password: "secret123".to_string(),
            role: Role::Teacher,
            full_name: Some(" ".to_string()),
            student_id: None,
        }
        .normalized();
        assert_eq!(user.username, "teacher1");
        assert!(user.full_name.is_none());
        assert!(user.validate().is_ok());

        let short = NewUser {
            password: "short".to_string(),
            ..user.clone()
        };
        assert!(short.validate().is_err());

        let tiny_name = NewUser {
            username: "ab".to_string(),
            ..user
        };
        assert!(tiny_name.validate().is_err());
    }
}
