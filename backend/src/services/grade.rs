//! Grade recording and listing service

use chrono::{NaiveDate, Utc};
use shared::{validate_new_grade, Grade, GradeEntry, GradeValue, NewGrade, Quarter, Role};

use crate::db::Db;
use crate::error::{AppError, AppResult};

/// Grade service for recording and listing grades
#[derive(Clone)]
pub struct GradeService {
    db: Db,
}

/// Database row for a grade joined with student and subject
#[derive(Debug, sqlx::FromRow)]
struct GradeEntryRow {
    grade_id: i64,
    student_id: i64,
    first_name: String,
    last_name: String,
    class_label: String,
    subject: String,
    grade: i64,
    date: NaiveDate,
    quarter: i64,
}

impl TryFrom<GradeEntryRow> for GradeEntry {
    type Error = AppError;

    fn try_from(row: GradeEntryRow) -> Result<Self, Self::Error> {
        let grade = GradeValue::new(row.grade)
            .map_err(|e| AppError::Internal(format!("Stored grade {}: {}", row.grade_id, e)))?;
        let quarter = Quarter::new(row.quarter)
            .map_err(|e| AppError::Internal(format!("Stored grade {}: {}", row.grade_id, e)))?;

        Ok(GradeEntry {
            grade_id: row.grade_id,
            student_id: row.student_id,
            first_name: row.first_name,
            last_name: row.last_name,
            class_label: row.class_label,
            subject: row.subject,
            grade,
            date: row.date,
            quarter,
        })
    }
}

const ENTRY_SELECT: &str = r#"
    SELECT g.id AS grade_id, s.id AS student_id, s.first_name, s.last_name,
           s.class AS class_label, sub.name AS subject, g.grade, g.date, g.quarter
    FROM grades g
    JOIN students s ON s.id = g.student_id
    JOIN subjects sub ON sub.id = g.subject_id
"#;

impl GradeService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Record a grade dated today (UTC)
    pub async fn create_grade(&self, input: &NewGrade) -> AppResult<Grade> {
        self.create_grade_dated(input, Utc::now().date_naive()).await
    }

    /// Record a grade with an explicit date.
    ///
    /// Nothing is written unless every field is valid and both the student
    /// and the subject exist.
    pub async fn create_grade_dated(&self, input: &NewGrade, date: NaiveDate) -> AppResult<Grade> {
        let valid = validate_new_grade(input)?;

        let grade_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO grades (student_id, subject_id, grade, date, quarter)
            SELECT ?, ?, ?, ?, ?
            WHERE EXISTS (SELECT 1 FROM students WHERE id = ?)
              AND EXISTS (SELECT 1 FROM subjects WHERE id = ?)
            RETURNING id
            "#,
        )
        .bind(valid.student_id)
        .bind(valid.subject_id)
        .bind(i64::from(valid.value))
        .bind(date)
        .bind(i64::from(valid.quarter))
        .bind(valid.student_id)
        .bind(valid.subject_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(grade_id) = grade_id else {
            return Err(self.missing_reference(valid.student_id).await);
        };

        tracing::info!(
            grade_id,
            student_id = valid.student_id,
            subject_id = valid.subject_id,
            grade = valid.value.get(),
            quarter = valid.quarter.get(),
            "Grade recorded"
        );

        Ok(Grade {
            id: grade_id,
            student_id: valid.student_id,
            subject_id: valid.subject_id,
            value: valid.value,
            date,
            quarter: valid.quarter,
        })
    }

    /// Which side of a rejected grade insert does not exist
    async fn missing_reference(&self, student_id: i64) -> AppError {
        let student = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students WHERE id = ?")
            .bind(student_id)
            .fetch_one(&self.db)
            .await;
        match student {
            Ok(0) => AppError::NotFound("Student".to_string()),
            Ok(_) => AppError::NotFound("Subject".to_string()),
            Err(e) => AppError::DatabaseError(e),
        }
    }

    /// Grades visible to a viewer.
    ///
    /// Students see only the grades of their linked student record, newest
    /// first, and nothing at all when unlinked. Everyone else sees every
    /// grade ordered by class, last name, subject and date.
    pub async fn grades_for_viewer(&self, role: Role, user_id: i64) -> AppResult<Vec<GradeEntry>> {
        let rows = if role.is_student() {
            sqlx::query_as::<_, GradeEntryRow>(&format!(
                r#"{}
                JOIN users u ON u.student_id = s.id
                WHERE u.id = ?
                ORDER BY g.date DESC, g.id DESC
                "#,
                ENTRY_SELECT
            ))
            .bind(user_id)
            .fetch_all(&self.db)
            .await?
        } else {
            sqlx::query_as::<_, GradeEntryRow>(&format!(
                "{} ORDER BY s.class, s.last_name, sub.name, g.date, g.id",
                ENTRY_SELECT
            ))
            .fetch_all(&self.db)
            .await?
        };

        rows.into_iter().map(GradeEntry::try_from).collect()
    }
}
