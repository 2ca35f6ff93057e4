//! Reporting HTTP handlers

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use shared::{parse_quarter, AverageGrade, Operation, Quarter, Student, Subject};

use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::reporting::{FailingStudentCsvRow, ReportingService};
use crate::services::{StudentService, SubjectService};
use crate::AppState;

/// A form value that may arrive as a JSON number or as text
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Number(i64),
    Text(String),
}

impl FormValue {
    fn as_text(&self) -> String {
        match self {
            FormValue::Number(n) => n.to_string(),
            FormValue::Text(s) => s.clone(),
        }
    }

    fn as_id(&self, field: &str) -> AppResult<i64> {
        match self {
            FormValue::Number(n) => Ok(*n),
            FormValue::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| AppError::validation(field, "Please fill in all fields")),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub quarter: Option<FormValue>,
    pub format: Option<String>, // "json" or "csv"
}

impl ReportParams {
    fn quarter(&self) -> AppResult<Quarter> {
        let raw = self.quarter.as_ref().map(FormValue::as_text);
        Ok(parse_quarter(raw.as_deref())?)
    }

    fn wants_csv(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("csv"))
    }
}

#[derive(Debug, Deserialize)]
pub struct AverageRequest {
    pub student_id: Option<FormValue>,
    pub subject_id: Option<FormValue>,
    pub quarter: Option<FormValue>,
}

/// Choices offered by the average grade form
#[derive(Serialize)]
pub struct AverageFormOptions {
    pub students: Vec<Student>,
    pub subjects: Vec<Subject>,
    pub quarters: Vec<Quarter>,
}

/// Options for the average grade form.
/// Students are only offered their own record.
pub async fn average_grade_form(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> AppResult<Json<AverageFormOptions>> {
    ctx.authorize(Operation::AverageGrade)?;

    let student_service = StudentService::new(state.db.clone());
    let students = if ctx.is_student() {
        match student_service.linked_to_user(ctx.user_id).await? {
            Some(student_id) => vec![student_service.get_student(student_id).await?],
            None => Vec::new(),
        }
    } else {
        student_service.list_students().await?
    };
    let subjects = SubjectService::new(state.db.clone()).list_subjects().await?;

    Ok(Json(AverageFormOptions {
        students,
        subjects,
        quarters: Quarter::all().collect(),
    }))
}

/// Compute a student's average in a subject for a quarter
pub async fn average_grade(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    WithRejection(Json(body), _): WithRejection<Json<AverageRequest>, AppError>,
) -> AppResult<Json<serde_json::Value>> {
    ctx.authorize(Operation::AverageGrade)?;

    let (Some(student_id), Some(subject_id)) = (&body.student_id, &body.subject_id) else {
        return Err(AppError::validation(
            if body.student_id.is_none() { "student_id" } else { "subject_id" },
            "Please fill in all fields",
        ));
    };
    let student_id = student_id.as_id("student_id")?;
    let subject_id = subject_id.as_id("subject_id")?;
    let quarter = parse_quarter(body.quarter.as_ref().map(FormValue::as_text).as_deref())?;

    let service = ReportingService::new(state.db.clone());
    let average: AverageGrade = service
        .average_grade_for(&ctx, student_id, subject_id, quarter)
        .await?;

    Ok(Json(serde_json::json!({
        "message": format!(
            "Average grade of {} in {} for quarter {}: {}",
            average.student_name, average.subject, average.quarter, average.average
        ),
        "result": average,
    })))
}

/// Failing grades per class (query string)
pub async fn count_twos(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    WithRejection(Query(params), _): WithRejection<Query<ReportParams>, AppError>,
) -> AppResult<Response> {
    failing_by_class_report(&state, &ctx, &params).await
}

/// Failing grades per class (JSON body)
pub async fn count_twos_submit(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    WithRejection(Json(params), _): WithRejection<Json<ReportParams>, AppError>,
) -> AppResult<Response> {
    failing_by_class_report(&state, &ctx, &params).await
}

/// Students with failing grades (query string)
pub async fn failing_students(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    WithRejection(Query(params), _): WithRejection<Query<ReportParams>, AppError>,
) -> AppResult<Response> {
    failing_students_report(&state, &ctx, &params).await
}

/// Students with failing grades (JSON body)
pub async fn failing_students_submit(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    WithRejection(Json(params), _): WithRejection<Json<ReportParams>, AppError>,
) -> AppResult<Response> {
    failing_students_report(&state, &ctx, &params).await
}

async fn failing_by_class_report(
    state: &AppState,
    ctx: &RequestContext,
    params: &ReportParams,
) -> AppResult<Response> {
    ctx.authorize(Operation::CountFailing)?;
    let quarter = params.quarter()?;

    let service = ReportingService::new(state.db.clone());
    let report = service.count_failing_by_class(quarter).await?;

    if params.wants_csv() {
        let csv = ReportingService::export_to_csv(&report.classes)?;
        Ok(csv_attachment(format!("failing_by_class_q{}.csv", quarter), csv))
    } else {
        Ok(Json(report).into_response())
    }
}

async fn failing_students_report(
    state: &AppState,
    ctx: &RequestContext,
    params: &ReportParams,
) -> AppResult<Response> {
    ctx.authorize(Operation::FailingStudents)?;
    let quarter = params.quarter()?;

    let service = ReportingService::new(state.db.clone());
    let students = service.failing_students(quarter).await?;

    if params.wants_csv() {
        let rows: Vec<FailingStudentCsvRow> = students.iter().map(FailingStudentCsvRow::from).collect();
        let csv = ReportingService::export_to_csv(&rows)?;
        Ok(csv_attachment(format!("failing_students_q{}.csv", quarter), csv))
    } else {
        Ok(Json(serde_json::json!({
            "quarter": quarter,
            "students": students,
        }))
        .into_response())
    }
}

fn csv_attachment(filename: String, csv: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    )
        .into_response()
}
