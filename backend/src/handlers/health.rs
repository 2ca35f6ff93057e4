//! Health check and index handlers

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;
use shared::{allowed_operations, Operation};

use crate::context::RequestContext;
use crate::middleware::optional_context;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

#[derive(Serialize)]
pub struct IndexResponse {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<RequestContext>,
    /// Operations the current user may perform, empty when logged out
    pub operations: Vec<Operation>,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Check database connectivity
    let db_status = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "connected".to_string(),
        Err(e) => {
            tracing::error!("Health check query failed: {}", e);
            "disconnected".to_string()
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    })
}

/// Index page: who is logged in and what they can do
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Json<IndexResponse> {
    let user = optional_context(&state, &headers).await;
    let operations = user
        .as_ref()
        .map(|ctx| allowed_operations(ctx.role))
        .unwrap_or_default();

    Json(IndexResponse {
        name: "Gradebook".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        user,
        operations,
    })
}
