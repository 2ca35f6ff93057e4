//! Student roster service

use shared::{NewStudent, Student};
use validator::Validate;

use crate::db::Db;
use crate::error::{AppError, AppResult};

/// Student service for managing the roster
#[derive(Clone)]
pub struct StudentService {
    db: Db,
}

/// Database row for a student
#[derive(Debug, sqlx::FromRow)]
struct StudentRow {
    id: i64,
    first_name: String,
    last_name: String,
    class_label: String,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            class_label: row.class_label,
        }
    }
}

impl StudentService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Add a student to the roster
    pub async fn create_student(&self, input: NewStudent) -> AppResult<Student> {
        let input = input.normalized();
        input.validate()?;

        let row = sqlx::query_as::<_, StudentRow>(
            r#"
            INSERT INTO students (first_name, last_name, class)
            VALUES (?, ?, ?)
            RETURNING id, first_name, last_name, class AS class_label
            "#,
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.class_label)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(student_id = row.id, class = %row.class_label, "Student added");

        Ok(row.into())
    }

    /// All students ordered by class, then last and first name
    pub async fn list_students(&self) -> AppResult<Vec<Student>> {
        let rows = sqlx::query_as::<_, StudentRow>(
            r#"
            SELECT id, first_name, last_name, class AS class_label
            FROM students
            ORDER BY class, last_name, first_name, id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Student::from).collect())
    }

    /// Get a student by id
    pub async fn get_student(&self, student_id: i64) -> AppResult<Student> {
        sqlx::query_as::<_, StudentRow>(
            "SELECT id, first_name, last_name, class AS class_label FROM students WHERE id = ?",
        )
        .bind(student_id)
        .fetch_optional(&self.db)
        .await?
        .map(Student::from)
        .ok_or_else(|| AppError::NotFound("Student".to_string()))
    }

    /// The student record a user account is linked to, if any
    pub async fn linked_to_user(&self, user_id: i64) -> AppResult<Option<i64>> {
        let linked = sqlx::query_scalar::<_, Option<i64>>("SELECT student_id FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(linked.flatten())
    }
}
