//! HTTP middleware

pub mod auth;

pub use auth::{
    auth_middleware, optional_context, resolve_context, session_tokens, CurrentUser, SESSION_COOKIE,
};
