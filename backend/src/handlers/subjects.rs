//! Subject HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::WithRejection;
use shared::{NewSubject, Operation};

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::SubjectService;
use crate::AppState;

/// List all subjects
pub async fn list_subjects(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> impl IntoResponse {
    if let Err(e) = ctx.authorize(Operation::ViewSubjects) {
        return e.into_response();
    }

    let service = SubjectService::new(state.db.clone());

    match service.list_subjects().await {
        Ok(subjects) => {
            (StatusCode::OK, Json(serde_json::json!({ "subjects": subjects }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Add a subject
pub async fn add_subject(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    WithRejection(Json(input), _): WithRejection<Json<NewSubject>, AppError>,
) -> impl IntoResponse {
    if let Err(e) = ctx.authorize(Operation::AddSubject) {
        return e.into_response();
    }

    let service = SubjectService::new(state.db.clone());

    match service.create_subject(input).await {
        Ok(subject) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": format!("Subject {} added", subject.name),
                "subject": subject,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
