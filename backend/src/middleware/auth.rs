//! Authentication middleware
//!
//! Resolves the session token on every protected request and hands the
//! caller's `RequestContext` to handlers.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::context::RequestContext;
use crate::error::AppError;
use crate::services::AuthService;
use crate::AppState;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// Session tokens the request carries, cookie first, then a Bearer header
pub fn session_tokens(headers: &HeaderMap) -> Vec<String> {
    let jar = CookieJar::from_headers(headers);
    let cookie = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty());

    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let mut tokens: Vec<String> = cookie.into_iter().collect();
    if let Some(bearer) = bearer {
        if !tokens.contains(&bearer) {
            tokens.push(bearer);
        }
    }
    tokens
}

/// Resolve the first live session among the request's tokens. A stale
/// cookie left behind by an old login does not shadow a valid Bearer token.
pub async fn resolve_context(state: &AppState, headers: &HeaderMap) -> Result<RequestContext, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config.auth);

    let mut last_error = AppError::Unauthenticated;
    for token in session_tokens(headers) {
        match auth_service.resolve_session(&token).await {
            Ok(ctx) => return Ok(ctx),
            Err(e) => last_error = e,
        }
    }
    Err(last_error)
}

/// Resolve the caller's session if the request carries a live one
pub async fn optional_context(state: &AppState, headers: &HeaderMap) -> Option<RequestContext> {
    resolve_context(state, headers).await.ok()
}

/// Authentication middleware that rejects requests without a live session
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if session_tokens(request.headers()).is_empty() {
        tracing::debug!(path = %request.uri().path(), "No session token");
        return AppError::Unauthenticated.into_response();
    }

    match resolve_context(&state, request.headers()).await {
        Ok(ctx) => {
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Extractor for the authenticated caller.
/// Only valid on routes behind `auth_middleware`.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub RequestContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderValue};

    #[test]
    fn test_session_tokens_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session=abc.def.ghi"));
        assert_eq!(session_tokens(&headers), vec!["abc.def.ghi"]);
    }

    #[test]
    fn test_session_tokens_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(session_tokens(&headers), vec!["tok"]);
    }

    #[test]
    fn test_session_tokens_cookie_then_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session=old"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer fresh"));
        assert_eq!(session_tokens(&headers), vec!["old", "fresh"]);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer old"));
        assert_eq!(session_tokens(&headers), vec!["old"]);
    }

    #[test]
    fn test_session_tokens_missing() {
        let mut headers = HeaderMap::new();
        assert!(session_tokens(&headers).is_empty());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert!(session_tokens(&headers).is_empty());

        headers.insert(COOKIE, HeaderValue::from_static("session="));
        assert!(session_tokens(&headers).is_empty());
    }
}
