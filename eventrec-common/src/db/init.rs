//! Database initialization
//!
//! Opening is idempotent: the database file, its parent directory and the
//! single `events` table are created when missing and reused otherwise.

use crate::{Error, Result};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

fn unavailable(e: sqlx::Error) -> Error {
    Error::StorageUnavailable(e.to_string())
}

/// Open (creating if needed) the on-disk event database
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::StorageUnavailable(format!("cannot create {}: {}", parent.display(), e))
        })?;
    }

    // mode=rwc: create the file when missing
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await
        .map_err(unavailable)?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets the HTTP readers proceed while the persistence worker writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await
        .map_err(unavailable)?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await
        .map_err(unavailable)?;

    create_events_table(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database (tests, throwaway sessions)
///
/// Pinned to a single connection that never expires: every `:memory:`
/// connection is its own database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .map_err(unavailable)?;

    create_events_table(&pool).await?;

    Ok(pool)
}

/// Create the events table
///
/// `record` holds the JSON form of the event; `id` duplicates the record's
/// identifier as the key. No schema version is kept: record decoding is
/// tolerant of missing fields instead.
pub async fn create_events_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY,
            record TEXT NOT NULL,
            stored_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(unavailable)?;

    Ok(())
}
