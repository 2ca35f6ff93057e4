//! Student roster HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::WithRejection;
use shared::{NewStudent, Operation};

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::StudentService;
use crate::AppState;

/// List all students
pub async fn list_students(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> impl IntoResponse {
    if let Err(e) = ctx.authorize(Operation::ViewStudents) {
        return e.into_response();
    }

    let service = StudentService::new(state.db.clone());

    match service.list_students().await {
        Ok(students) => {
            (StatusCode::OK, Json(serde_json::json!({ "students": students }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Add a student to the roster
pub async fn add_student(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    WithRejection(Json(input), _): WithRejection<Json<NewStudent>, AppError>,
) -> impl IntoResponse {
    if let Err(e) = ctx.authorize(Operation::AddStudent) {
        return e.into_response();
    }

    let service = StudentService::new(state.db.clone());

    match service.create_student(input).await {
        Ok(student) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": format!("Student {} added", student.full_name()),
                "student": student,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
