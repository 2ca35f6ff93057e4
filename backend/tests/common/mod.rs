//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use gradebook_backend::{
    config::{AuthConfig, Config, DatabaseConfig, SeedConfig, ServerConfig},
    db::{self, Db},
    services::{GradeService, StudentService},
    AppState,
};
use shared::{NewGrade, NewStudent, Student};

/// Cheap bcrypt cost so tests stay fast
pub const TEST_BCRYPT_COST: u32 = 4;

pub async fn test_db() -> Db {
    db::init(&DatabaseConfig::in_memory(), &SeedConfig::default(), TEST_BCRYPT_COST)
        .await
        .expect("initialize in-memory database")
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret-key".to_string(),
        session_expiry: 3600,
        bcrypt_cost: TEST_BCRYPT_COST,
    }
}

pub fn test_state(db: Db) -> AppState {
    AppState {
        db,
        config: Arc::new(Config {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig::in_memory(),
            auth: auth_config(),
            seed: SeedConfig::default(),
        }),
    }
}

pub async fn add_student(db: &Db, first: &str, last: &str, class: &str) -> Student {
    StudentService::new(db.clone())
        .create_student(NewStudent {
            first_name: first.to_string(),
            last_name: last.to_string(),
            class_label: class.to_string(),
        })
        .await
        .expect("create student")
}

pub async fn subject_id(db: &Db, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT id FROM subjects WHERE name = ?")
        .bind(name)
        .fetch_one(db)
        .await
        .expect("seeded subject")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub async fn add_grade(db: &Db, student_id: i64, subject_id: i64, grade: i64, quarter: i64, on: NaiveDate) {
    GradeService::new(db.clone())
        .create_grade_dated(
            &NewGrade {
                student_id: Some(student_id),
                subject_id: Some(subject_id),
                grade: Some(grade),
                quarter: Some(quarter),
            },
            on,
        )
        .await
        .expect("create grade");
}

pub async fn count_rows(db: &Db, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(db)
        .await
        .expect("count rows")
}
