//! Request-scoped identity of the authenticated caller

use serde::Serialize;
use shared::{is_allowed, Operation, Role};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Who is making the current request.
///
/// Built by the auth middleware from a live session and handed to
/// handlers and services explicitly.
#[derive(Clone, Debug, Serialize)]
pub struct RequestContext {
    #[serde(skip)]
    pub session_id: Uuid,
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub display_name: String,
}

impl RequestContext {
    /// Check if the caller may perform an operation
    pub fn can(&self, operation: Operation) -> bool {
        is_allowed(self.role, operation)
    }

    /// Fail with an access-denied error unless the caller's role allows the operation
    pub fn authorize(&self, operation: Operation) -> AppResult<()> {
        if self.can(operation) {
            Ok(())
        } else {
            tracing::warn!(
                user_id = self.user_id,
                role = %self.role,
                %operation,
                "Access denied"
            );
            Err(AppError::AccessDenied(operation.to_string()))
        }
    }

    pub fn is_student(&self) -> bool {
        self.role.is_student()
    }
}
