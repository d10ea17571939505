//! SQLite pending store using sqlx.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use crate::store::PendingStore;
use crate::types::{PendingMessage, PendingStatus, QueueStats};
use crate::StorageError;

/// SQLite-backed [`PendingStore`].
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to `database_url` (e.g. `sqlite://courier.db`), creating the
    /// file and running migrations if needed.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StorageError::Migration(format!("invalid database url: {e}")))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().max_connections(8).connect_with(options).await?;
        run_migrations(&pool).await?;
        tracing::info!(database_url, "pending store connected");
        Ok(Self { pool })
    }

    /// Close the underlying pool. Part of the shutdown sequence.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pending_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipient TEXT NOT NULL,
            payload TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'queued',
            attempts INTEGER NOT NULL DEFAULT 0,
            last_error TEXT,
            created_at_epoch INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| StorageError::Migration(e.to_string()))?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pending_status_created
         ON pending_messages (status, created_at_epoch, id)",
    )
    .execute(pool)
    .await
    .map_err(|e| StorageError::Migration(e.to_string()))?;

    Ok(())
}

fn row_to_message(row: &SqliteRow) -> Result<PendingMessage, StorageError> {
    let status_str: String = row.try_get("status")?;
    Ok(PendingMessage {
        id: row.try_get("id")?,
        recipient: row.try_get("recipient")?,
        payload: row.try_get("payload")?,
        status: status_str.parse()?,
        attempts: row.try_get("attempts")?,
        last_error: row.try_get("last_error")?,
        created_at_epoch: row.try_get("created_at_epoch")?,
    })
}

async fn fetch_by_status(
    pool: &SqlitePool,
    status: PendingStatus,
    limit: usize,
) -> Result<Vec<PendingMessage>, StorageError> {
    let rows = sqlx::query(
        "SELECT id, recipient, payload, status, attempts, last_error, created_at_epoch
         FROM pending_messages
         WHERE status = ?
         ORDER BY created_at_epoch ASC, id ASC
         LIMIT ?",
    )
    .bind(status.as_str())
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;
    rows.iter().map(row_to_message).collect()
}

#[async_trait]
impl PendingStore for SqliteStore {
    async fn enqueue(&self, recipient: &str, payload: &str) -> Result<i64, StorageError> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query(
            "INSERT INTO pending_messages (recipient, payload, status, created_at_epoch)
             VALUES (?, ?, 'queued', ?)",
        )
        .bind(recipient)
        .bind(payload)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn fetch_oldest(&self, limit: usize) -> Result<Vec<PendingMessage>, StorageError> {
        fetch_by_status(&self.pool, PendingStatus::Queued, limit).await
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        // Deleting zero rows is fine: a concurrent delete already won.
        sqlx::query("DELETE FROM pending_messages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record_failure(
        &self,
        id: i64,
        error: &str,
        max_attempts: u32,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "UPDATE pending_messages
             SET attempts = attempts + 1,
                 last_error = ?,
                 status = CASE WHEN attempts + 1 >= ? THEN 'dead' ELSE status END
             WHERE id = ?",
        )
        .bind(error)
        .bind(i64::from(max_attempts))
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_queued(&self) -> Result<u64, StorageError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pending_messages WHERE status = 'queued'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    async fn stats(&self) -> Result<QueueStats, StorageError> {
        let queued: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pending_messages WHERE status = 'queued'")
                .fetch_one(&self.pool)
                .await?;
        let dead: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pending_messages WHERE status = 'dead'")
                .fetch_one(&self.pool)
                .await?;
        Ok(QueueStats { queued: queued as u64, dead: dead as u64 })
    }

    async fn list(&self, limit: usize) -> Result<Vec<PendingMessage>, StorageError> {
        fetch_by_status(&self.pool, PendingStatus::Queued, limit).await
    }

    async fn dead_letters(&self, limit: usize) -> Result<Vec<PendingMessage>, StorageError> {
        fetch_by_status(&self.pool, PendingStatus::Dead, limit).await
    }

    async fn requeue_dead(&self) -> Result<u64, StorageError> {
        let result = sqlx::query(
            "UPDATE pending_messages
             SET status = 'queued', attempts = 0, last_error = NULL
             WHERE status = 'dead'",
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn purge_dead(&self) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM pending_messages WHERE status = 'dead'")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
