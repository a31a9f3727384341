pub mod models;
pub mod persons;
pub mod users;

pub use models::*;
pub use persons::{PersonRepository, SqlitePersonRepository};
pub use users::{SqliteUserRepository, UserRepository};

use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

pub type DbPool = SqlitePool;

/// Execute a SQL migration file, properly handling comments
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    for statement in sql.split(';') {
        // Strip SQL comment lines (lines starting with --)
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

pub async fn init(data_dir: &Path) -> Result<DbPool> {
    let db_path = data_dir.join("inkstone.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    info!("Initializing database at {}", db_path.display());
    connect(&db_url).await
}

/// Connect to a database URL, apply pragmas and run migrations.
///
/// Tests use this directly with `sqlite::memory:`.
pub async fn connect(db_url: &str) -> Result<DbPool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    // Enable WAL mode for better concurrency
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

/// Fresh throwaway database for tests, isolated per call.
#[cfg(test)]
pub async fn connect_test() -> DbPool {
    let dir = std::env::temp_dir().join(format!("inkstone-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("test data dir");
    init(&dir).await.expect("test database")
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    // Migration 001: Users table
    execute_sql(pool, include_str!("../../migrations/001_users.sql")).await?;

    // Migration 002: Persons table with its seed row
    execute_sql(pool, include_str!("../../migrations/002_persons.sql")).await?;

    Ok(())
}
