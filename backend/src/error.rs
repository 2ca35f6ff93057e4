//! Error handling for the Gradebook server
//!
//! Every error is recovered at the request boundary and rendered as a
//! flash-style message in English and Russian.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::FieldError;
use thiserror::Error;
use validator::ValidationErrors;

/// Page unauthenticated callers are sent to
pub const LOGIN_PAGE: &str = "/login";

/// Safe default page for callers denied an operation
pub const DEFAULT_PAGE: &str = "/";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    // Validation errors
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn conflict(resource: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Conflict {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        AppError::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        shared::first_field_error(&errors).into()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = rejection.body_text();
        let field = rejected_field(&detail).unwrap_or("body").to_string();
        AppError::validation(field, detail)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        let detail = rejection.body_text();
        let field = rejected_field(&detail).unwrap_or("query").to_string();
        AppError::validation(field, detail)
    }
}

/// Field named by a body decode error: either the path prefix of a typed
/// value ("grade: invalid value ...") or a "missing field `role`" message.
fn rejected_field(detail: &str) -> Option<&str> {
    if let Some(rest) = detail.split_once("target type: ").map(|(_, rest)| rest) {
        if let Some((path, _)) = rest.split_once(": ") {
            let is_path = !path.is_empty()
                && path.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
            if is_path {
                return Some(path);
            }
        }
    }
    let start = detail.find("field `")? + "field `".len();
    let len = detail[start..].find('`')?;
    Some(&detail[start..start + len])
}

/// True when the store rejected a write because of a UNIQUE constraint
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_ru: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl ErrorDetail {
    fn new(code: &str, message_en: impl Into<String>, message_ru: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message_en: message_en.into(),
            message_ru: message_ru.into(),
            field: None,
            redirect: None,
        }
    }

    fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    fn with_redirect(mut self, target: &str) -> Self {
        self.redirect = Some(target.to_string());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new(
                    "INVALID_CREDENTIALS",
                    "Invalid username or password",
                    "Неверное имя пользователя или пароль",
                ),
            ),
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new(
                    "AUTHENTICATION_REQUIRED",
                    "Please log in",
                    "Пожалуйста, войдите в систему",
                )
                .with_redirect(LOGIN_PAGE),
            ),
            AppError::AccessDenied(_) => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new(
                    "ACCESS_DENIED",
                    "You do not have permission to perform this operation",
                    "Недостаточно прав для выполнения этой операции",
                )
                .with_redirect(DEFAULT_PAGE),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new(
                    "VALIDATION_ERROR",
                    message.clone(),
                    format!("Некорректные данные: {}", message),
                )
                .with_field(field),
            ),
            AppError::Conflict { resource, message } => (
                StatusCode::CONFLICT,
                ErrorDetail::new(
                    "CONFLICT",
                    message.clone(),
                    format!("Запись уже существует: {}", resource),
                )
                .with_field(resource),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new(
                    "NOT_FOUND",
                    format!("{} not found", resource),
                    format!("Не найдено: {}", resource),
                ),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "DATABASE_ERROR",
                    "A database error occurred",
                    "Ошибка базы данных",
                ),
            ),
            AppError::Internal(_) | AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "INTERNAL_ERROR",
                    "An internal server error occurred",
                    "Внутренняя ошибка сервера",
                ),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!(code = %error_detail.code, "Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
