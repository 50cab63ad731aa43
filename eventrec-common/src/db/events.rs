//! Whole-collection event persistence
//!
//! The store exposes exactly two bulk operations: replace every row, read every
//! row. There is no per-record write; the repository always persists its full
//! in-memory list.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::debug;

use super::init::{init_database, init_memory_database};
use crate::model::Event;
use crate::{Error, Result};

/// Bulk persistence seam used by the repository
#[async_trait]
pub trait EventStorage: Send + Sync {
    /// Atomically replace the table contents with `records`
    ///
    /// All-or-nothing: on failure the previous contents are left untouched.
    async fn replace_all(&self, records: &[Event]) -> Result<()>;

    /// Every stored record, ordered by id
    ///
    /// Storage order says nothing about display order; that belongs to the
    /// in-memory list.
    async fn read_all(&self) -> Result<Vec<Event>>;
}

/// SQLite-backed event table
#[derive(Clone)]
pub struct SqliteEventStore {
    pool: SqlitePool,
}

impl SqliteEventStore {
    /// Open (idempotently creating) the database at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = init_database(db_path).await?;
        Ok(Self { pool })
    }

    /// Private in-memory store
    pub async fn open_in_memory() -> Result<Self> {
        let pool = init_memory_database().await?;
        Ok(Self { pool })
    }

    /// Wrap an already-initialized pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Number of stored rows
    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::ReadFailed(e.to_string()))
    }
}

#[async_trait]
impl EventStorage for SqliteEventStore {
    async fn replace_all(&self, records: &[Event]) -> Result<()> {
        // Encode everything up front so a bad record fails before the table is touched
        let rows = records
            .iter()
            .map(|event| {
                serde_json::to_string(event)
                    .map(|json| (event.id as i64, json))
                    .map_err(|e| Error::WriteFailed(format!("encoding event {}: {}", event.id, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        let write_err = |e: sqlx::Error| Error::WriteFailed(e.to_string());

        // Dropping the transaction on any early return rolls it back
        let mut tx = self.pool.begin().await.map_err(write_err)?;

        sqlx::query("DELETE FROM events")
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;

        for (id, json) in &rows {
            sqlx::query("INSERT INTO events (id, record) VALUES (?, ?)")
                .bind(id)
                .bind(json)
                .execute(&mut *tx)
                .await
                .map_err(|e| Error::WriteFailed(format!("inserting event {}: {}", id, e)))?;
        }

        tx.commit().await.map_err(write_err)?;

        debug!("Persisted {} event(s)", rows.len());
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<Event>> {
        let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, record FROM events ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::ReadFailed(e.to_string()))?;

        rows.into_iter()
            .map(|(id, json)| {
                serde_json::from_str::<Event>(&json)
                    .map_err(|e| Error::ReadFailed(format!("decoding event {}: {}", id, e)))
            })
            .collect()
    }
}
