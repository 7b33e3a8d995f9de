//! Database initialization
//!
//! Creates the database on first run and applies the schema idempotently.
//! Foreign keys are enabled so that deleting a group cascades to its reviews.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc creates the database file if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_pool(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

/// Create an in-memory database with the full schema. Test support.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    configure_pool(&pool).await?;
    create_schema(&pool).await?;
    Ok(pool)
}

async fn configure_pool(pool: &SqlitePool) -> Result<()> {
    // Required for ON DELETE CASCADE from review_groups to reviews
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL allows concurrent readers while one upload is being written
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}

/// Apply the schema. Idempotent, safe to call on every startup.
async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS review_groups (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            review_count INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            guid TEXT PRIMARY KEY,
            group_id TEXT NOT NULL REFERENCES review_groups(guid) ON DELETE CASCADE,
            seq_index INTEGER NOT NULL,
            text TEXT NOT NULL,
            label TEXT NOT NULL,
            source TEXT NOT NULL DEFAULT '',
            confidence REAL NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Read path is always "reviews of one group in upload order"
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_reviews_group_seq ON reviews(group_id, seq_index)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let pool = init_memory_database().await.unwrap();
        // Second application must not fail
        create_schema(&pool).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert!(tables.contains(&"review_groups".to_string()));
        assert!(tables.contains(&"reviews".to_string()));
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let pool = init_memory_database().await.unwrap();

        let result = sqlx::query(
            "INSERT INTO reviews (guid, group_id, seq_index, text, label, source, confidence)
             VALUES ('r1', 'no-such-group', 0, 'hello world', 'Positive', '', 0.5)",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err(), "orphan review insert should fail");
    }

    #[tokio::test]
    async fn on_disk_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("reva.db");
        let _pool = init_database(&path).await.unwrap();
        assert!(path.exists());
    }
}
