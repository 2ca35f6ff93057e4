//! Grade HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use shared::{
    group_by_student, GradeEntry, NewGrade, Operation, Quarter, Student, StudentGrades, Subject,
    MAX_GRADE, MIN_GRADE,
};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::{GradeService, StudentService, SubjectService};
use crate::AppState;

/// Choices offered by the grade entry form
#[derive(Serialize)]
pub struct GradeFormOptions {
    pub students: Vec<Student>,
    pub subjects: Vec<Subject>,
    pub quarters: Vec<Quarter>,
    pub grades: Vec<u8>,
}

#[derive(Serialize)]
pub struct GradesResponse {
    pub grades: Vec<GradeEntry>,
    pub by_student: Vec<StudentGrades>,
}

/// Options for the grade entry form
pub async fn add_grade_form(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> AppResult<Json<GradeFormOptions>> {
    ctx.authorize(Operation::AddGrade)?;

    let students = StudentService::new(state.db.clone()).list_students().await?;
    let subjects = SubjectService::new(state.db.clone()).list_subjects().await?;

    Ok(Json(GradeFormOptions {
        students,
        subjects,
        quarters: Quarter::all().collect(),
        grades: (MIN_GRADE..=MAX_GRADE).collect(),
    }))
}

/// Record a grade dated today
pub async fn add_grade(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    WithRejection(Json(input), _): WithRejection<Json<NewGrade>, AppError>,
) -> impl IntoResponse {
    if let Err(e) = ctx.authorize(Operation::AddGrade) {
        return e.into_response();
    }

    let service = GradeService::new(state.db.clone());

    match service.create_grade(&input).await {
        Ok(grade) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Grade added successfully",
                "grade": grade,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Grades visible to the caller, flat and grouped per student
pub async fn view_grades(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> AppResult<Json<GradesResponse>> {
    ctx.authorize(Operation::ViewGrades)?;

    let grades = GradeService::new(state.db.clone())
        .grades_for_viewer(ctx.role, ctx.user_id)
        .await?;
    let by_student = group_by_student(&grades);

    Ok(Json(GradesResponse { grades, by_student }))
}
