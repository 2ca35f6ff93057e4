//! Reporting service for averages and failing-grade summaries

use serde::Serialize;
use shared::{
    collate_failing_students, mean_rounded, AverageGrade, ClassFailingCount,
    FailingByClassReport, FailingStudent, FailingSubjectRow, Operation, Quarter, FAILING_GRADE,
};

use crate::context::RequestContext;
use crate::db::Db;
use crate::error::{AppError, AppResult};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: Db,
}

#[derive(Debug, sqlx::FromRow)]
struct AverageRow {
    first_name: String,
    last_name: String,
    subject: String,
    grade_count: i64,
    grade_sum: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct ClassCountRow {
    class_label: String,
    failing_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct FailingRow {
    student_id: i64,
    first_name: String,
    last_name: String,
    class_label: String,
    subject: String,
    failing_count: i64,
}

impl From<FailingRow> for FailingSubjectRow {
    fn from(row: FailingRow) -> Self {
        FailingSubjectRow {
            student_id: row.student_id,
            first_name: row.first_name,
            last_name: row.last_name,
            class_label: row.class_label,
            subject: row.subject,
            failing_count: row.failing_count,
        }
    }
}

/// Flat CSV row for the failing-students report
#[derive(Debug, Serialize)]
pub struct FailingStudentCsvRow {
    pub student_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub class: String,
    pub failing_count: i64,
    pub subjects: String,
}

impl From<&FailingStudent> for FailingStudentCsvRow {
    fn from(student: &FailingStudent) -> Self {
        Self {
            student_id: student.student_id,
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            class: student.class_label.clone(),
            failing_count: student.failing_count,
            subjects: student.subjects.join("; "),
        }
    }
}

impl ReportingService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Mean grade of a student in a subject for a quarter.
    ///
    /// Fails with not-found when the student has no such grades.
    pub async fn average_grade(
        &self,
        student_id: i64,
        subject_id: i64,
        quarter: Quarter,
    ) -> AppResult<AverageGrade> {
        let row = sqlx::query_as::<_, AverageRow>(
            r#"
            SELECT s.first_name, s.last_name, sub.name AS subject,
                   COUNT(g.id) AS grade_count, SUM(g.grade) AS grade_sum
            FROM grades g
            JOIN students s ON s.id = g.student_id
            JOIN subjects sub ON sub.id = g.subject_id
            WHERE g.student_id = ? AND g.subject_id = ? AND g.quarter = ?
            GROUP BY s.id, sub.id
            "#,
        )
        .bind(student_id)
        .bind(subject_id)
        .bind(i64::from(quarter))
        .fetch_optional(&self.db)
        .await?;

        let Some(row) = row else {
            return Err(AppError::NotFound("Grades".to_string()));
        };
        let Some(average) = mean_rounded(row.grade_sum, row.grade_count) else {
            return Err(AppError::NotFound("Grades".to_string()));
        };

        Ok(AverageGrade {
            student_id,
            student_name: format!("{} {}", row.first_name, row.last_name),
            subject_id,
            subject: row.subject,
            quarter,
            average,
            grade_count: row.grade_count,
        })
    }

    /// Average grade as requested by a caller.
    ///
    /// Student callers may only ask about their own linked student record.
    pub async fn average_grade_for(
        &self,
        ctx: &RequestContext,
        student_id: i64,
        subject_id: i64,
        quarter: Quarter,
    ) -> AppResult<AverageGrade> {
        ctx.authorize(Operation::AverageGrade)?;

        if ctx.is_student() {
            let linked = sqlx::query_scalar::<_, Option<i64>>("SELECT student_id FROM users WHERE id = ?")
                .bind(ctx.user_id)
                .fetch_optional(&self.db)
                .await?
                .flatten();

            if linked != Some(student_id) {
                tracing::warn!(
                    user_id = ctx.user_id,
                    requested = student_id,
                    "Student asked for another student's average"
                );
                return Err(AppError::AccessDenied(Operation::AverageGrade.to_string()));
            }
        }

        self.average_grade(student_id, subject_id, quarter).await
    }

    /// Failing grades per class for a quarter
    pub async fn count_failing_by_class(&self, quarter: Quarter) -> AppResult<FailingByClassReport> {
        let rows = sqlx::query_as::<_, ClassCountRow>(
            r#"
            SELECT s.class AS class_label, COUNT(*) AS failing_count
            FROM grades g
            JOIN students s ON s.id = g.student_id
            WHERE g.grade = ? AND g.quarter = ?
            GROUP BY s.class
            ORDER BY s.class
            "#,
        )
        .bind(i64::from(FAILING_GRADE))
        .bind(i64::from(quarter))
        .fetch_all(&self.db)
        .await?;

        let classes = rows
            .into_iter()
            .map(|row| ClassFailingCount {
                class_label: row.class_label,
                failing_count: row.failing_count,
            })
            .collect();

        Ok(FailingByClassReport::new(quarter, classes))
    }

    /// Students with at least one failing grade in a quarter
    pub async fn failing_students(&self, quarter: Quarter) -> AppResult<Vec<FailingStudent>> {
        let rows = sqlx::query_as::<_, FailingRow>(
            r#"
            SELECT s.id AS student_id, s.first_name, s.last_name, s.class AS class_label,
                   sub.name AS subject, COUNT(*) AS failing_count
            FROM grades g
            JOIN students s ON s.id = g.student_id
            JOIN subjects sub ON sub.id = g.subject_id
            WHERE g.grade = ? AND g.quarter = ?
            GROUP BY s.id, sub.id
            HAVING COUNT(*) > 0
            "#,
        )
        .bind(i64::from(FAILING_GRADE))
        .bind(i64::from(quarter))
        .fetch_all(&self.db)
        .await?;

        Ok(collate_failing_students(
            rows.into_iter().map(FailingSubjectRow::from).collect(),
        ))
    }

    /// Export data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_to_csv_writes_header_and_rows() {
        let rows = vec![
            ClassFailingCount {
                class_label: "10A".to_string(),
                failing_count: 2,
            },
            ClassFailingCount {
                class_label: "10B".to_string(),
                failing_count: 1,
            },
        ];

        let csv = ReportingService::export_to_csv(&rows).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["class_label,failing_count", "10A,2", "10B,1"]);
    }

    #[test]
    fn test_failing_student_csv_row_joins_subjects() {
        let student = FailingStudent {
            student_id: 4,
            first_name: "Ivan".to_string(),
            last_name: "Petrov".to_string(),
            class_label: "8A".to_string(),
            failing_count: 3,
            subjects: vec!["History".to_string(), "Physics".to_string()],
        };

        let row = FailingStudentCsvRow::from(&student);
        assert_eq!(row.subjects, "History; Physics");
        assert_eq!(row.class, "8A");
    }
}
