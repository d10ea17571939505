//! Typed error enum for the service layer.

use courier_channel::ChannelError;
use courier_storage::StorageError;
use thiserror::Error;

/// Service-layer error unifying storage and channel failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed. Fatal for the delivery guarantee; callers
    /// escalate instead of absorbing it.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Channel send failed. Always recovered locally (enqueue / retry later).
    #[error("channel: {0}")]
    Channel(#[from] ChannelError),

    /// Caller provided invalid input (missing or blank field).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
