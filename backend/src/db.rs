//! Database pool, schema migrations and first-run seed data

use std::{str::FromStr, time::Duration};

use bcrypt::hash;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::config::{DatabaseConfig, SeedConfig};
use crate::error::{AppError, AppResult};

/// Connection pool shared by all services
pub type Db = SqlitePool;

/// Open the connection pool.
///
/// An in-memory database lives and dies with its connection, so the pool is
/// pinned to one connection that is never recycled.
pub async fn connect(config: &DatabaseConfig) -> Result<Db, sqlx::Error> {
    let in_memory = config.url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let mut pool_options = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));
    pool_options = if in_memory {
        pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
    };

    pool_options.connect_with(options).await
}

/// Create the schema if it does not exist yet
pub async fn migrate(db: &Db) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(db).await
}

/// Seed default subjects and the administrator account into an empty database.
///
/// Each table is only seeded while it is empty, so running this on every
/// start is safe.
pub async fn seed(db: &Db, seed: &SeedConfig, bcrypt_cost: u32) -> AppResult<()> {
    let mut tx = db.begin().await?;

    let subject_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subjects")
        .fetch_one(&mut *tx)
        .await?;

    if subject_count == 0 {
        for name in &seed.subjects {
            sqlx::query("INSERT OR IGNORE INTO subjects (name) VALUES (?)")
                .bind(name.trim())
                .execute(&mut *tx)
                .await?;
        }
        tracing::info!(count = seed.subjects.len(), "Seeded default subjects");
    }

    let user_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *tx)
        .await?;

    if user_count == 0 {
        let password_hash = hash(&seed.admin_password, bcrypt_cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        sqlx::query("INSERT INTO users (username, password_hash, role) VALUES (?, ?, 'admin')")
            .bind(&seed.admin_username)
            .bind(&password_hash)
            .execute(&mut *tx)
            .await?;

        tracing::warn!(
            username = %seed.admin_username,
            "Created default administrator account; change its password"
        );
    }

    tx.commit().await?;
    Ok(())
}

/// Connect, migrate and seed in one step
pub async fn init(
    config: &DatabaseConfig,
    seed_config: &SeedConfig,
    bcrypt_cost: u32,
) -> anyhow::Result<Db> {
    let db = connect(config).await?;
    migrate(&db).await?;
    seed(&db, seed_config, bcrypt_cost).await?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_seeds_once() {
        let seed_config = SeedConfig::default();
        let db = init(&DatabaseConfig::in_memory(), &seed_config, 4)
            .await
            .expect("init");

        // Second run must not duplicate anything
        migrate(&db).await.expect("migrate again");
        seed(&db, &seed_config, 4).await.expect("seed again");

        let subjects: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subjects")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(subjects, seed_config.subjects.len() as i64);

        let admins: Vec<(String, String)> =
            sqlx::query_as("SELECT username, password_hash FROM users WHERE role = 'admin'")
                .fetch_all(&db)
                .await
                .unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].0, "admin");
        assert_ne!(admins[0].1, "admin123");
        assert!(bcrypt::verify("admin123", &admins[0].1).unwrap());
    }

    #[tokio::test]
    async fn test_schema_rejects_out_of_range_grade() {
        let db = init(&DatabaseConfig::in_memory(), &SeedConfig::default(), 4)
            .await
            .unwrap();

        sqlx::query("INSERT INTO students (first_name, last_name, class) VALUES ('A', 'B', '5A')")
            .execute(&db)
            .await
            .unwrap();

        let result = sqlx::query(
            "INSERT INTO grades (student_id, subject_id, grade, date, quarter) VALUES (1, 1, 7, '2024-09-01', 1)",
        )
        .execute(&db)
        .await;
        assert!(result.is_err());

        let missing_student = sqlx::query(
            "INSERT INTO grades (student_id, subject_id, grade, date, quarter) VALUES (99, 1, 4, '2024-09-01', 1)",
        )
        .execute(&db)
        .await;
        assert!(missing_student.is_err());
    }
}
