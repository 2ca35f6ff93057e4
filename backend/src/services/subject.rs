//! Subject catalogue service

use shared::{NewSubject, Subject};
use validator::Validate;

use crate::db::Db;
use crate::error::{is_unique_violation, AppError, AppResult};

#[derive(Clone)]
pub struct SubjectService {
    db: Db,
}

#[derive(Debug, sqlx::FromRow)]
struct SubjectRow {
    id: i64,
    name: String,
}

impl From<SubjectRow> for Subject {
    fn from(row: SubjectRow) -> Self {
        Subject {
            id: row.id,
            name: row.name,
        }
    }
}

impl SubjectService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Add a subject. Names are unique.
    pub async fn create_subject(&self, input: NewSubject) -> AppResult<Subject> {
        let input = input.normalized();
        input.validate()?;

        let row = sqlx::query_as::<_, SubjectRow>(
            "INSERT INTO subjects (name) VALUES (?) RETURNING id, name",
        )
        .bind(&input.name)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("subject", format!("Subject '{}' already exists", input.name))
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        tracing::info!(subject_id = row.id, name = %row.name, "Subject added");

        Ok(row.into())
    }

    /// All subjects ordered by name
    pub async fn list_subjects(&self) -> AppResult<Vec<Subject>> {
        let rows = sqlx::query_as::<_, SubjectRow>("SELECT id, name FROM subjects ORDER BY name, id")
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Subject::from).collect())
    }
}
