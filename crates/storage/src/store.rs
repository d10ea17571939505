//! The pending-store seam.

use async_trait::async_trait;

use crate::{PendingMessage, QueueStats, StorageError};

/// Durable queue of messages that failed immediate delivery.
///
/// Implementations must make each operation a single atomic statement;
/// the ingestion path (writer) and the retry cycle (only reader of
/// existing rows) rely on that instead of in-process locking.
#[async_trait]
pub trait PendingStore: Send + Sync {
    /// Insert a new queued entry, returning its store id.
    async fn enqueue(&self, recipient: &str, payload: &str) -> Result<i64, StorageError>;

    /// Up to `limit` queued entries, oldest first. Does not mutate.
    async fn fetch_oldest(&self, limit: usize) -> Result<Vec<PendingMessage>, StorageError>;

    /// Idempotent removal. Deleting a missing id is not an error.
    async fn delete(&self, id: i64) -> Result<(), StorageError>;

    /// Record a failed retry: bump `attempts`, keep the last error, and
    /// dead-letter the row once `attempts` reaches `max_attempts`.
    ///
    /// Only called when retries are bounded (`max_attempts > 0`); in the
    /// baseline a failed retry leaves the row untouched.
    async fn record_failure(
        &self,
        id: i64,
        error: &str,
        max_attempts: u32,
    ) -> Result<(), StorageError>;

    /// Number of entries currently waiting for retry.
    async fn count_queued(&self) -> Result<u64, StorageError>;

    /// Row counts by status.
    async fn stats(&self) -> Result<QueueStats, StorageError>;

    /// Up to `limit` queued entries for inspection, oldest first.
    async fn list(&self, limit: usize) -> Result<Vec<PendingMessage>, StorageError>;

    /// Up to `limit` dead-lettered entries, oldest first.
    async fn dead_letters(&self, limit: usize) -> Result<Vec<PendingMessage>, StorageError>;

    /// Return all dead letters to the queue with a fresh attempt budget.
    /// Returns the number of rows requeued.
    async fn requeue_dead(&self) -> Result<u64, StorageError>;

    /// Delete all dead letters. Returns the number of rows removed.
    async fn purge_dead(&self) -> Result<u64, StorageError>;
}
