//! Typed error enum for the storage layer.
//!
//! Any storage error is a fault of the delivery guarantee itself: an
//! un-persisted failed message would be lost. Callers therefore never
//! absorb these; they escalate (HTTP 500 + fatal shutdown, retry worker
//! halt, startup abort).

use thiserror::Error;

/// Storage-layer error. Always fatal for the subsystem that hits it.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQL / connection / timeout failure.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Schema migration failure at connect time.
    #[error("migration error: {0}")]
    Migration(String),

    /// Row data could not be mapped into a domain type.
    #[error("data corruption: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}
