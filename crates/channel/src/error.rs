//! Typed error for channel sends.
//!
//! Variants exist for logging and the status surface only; the retry
//! machinery treats every one of them the same way (retryable).

use thiserror::Error;

/// Failure of a single send (or probe) against the channel gateway.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The send did not complete within the configured bound.
    #[error("send timed out")]
    Timeout,

    /// The gateway could not be reached.
    #[error("gateway unreachable: {0}")]
    Connect(String),

    /// The gateway refused the message (4xx).
    #[error("send rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// The gateway itself failed (5xx or malformed response).
    #[error("gateway error: {0}")]
    Gateway(String),

    /// The channel reported itself unusable.
    #[error("channel unavailable: {0}")]
    Unavailable(String),
}
