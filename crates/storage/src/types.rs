//! Queue row types shared across modules.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::StorageError;

/// Status of a pending message in the retry queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingStatus {
    /// Waiting for the next retry cycle.
    Queued,
    /// Exhausted the configured attempt bound; awaits operator action.
    Dead,
}

impl PendingStatus {
    /// Returns the string representation stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Queued => "queued",
            Self::Dead => "dead",
        }
    }
}

impl FromStr for PendingStatus {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "dead" => Ok(Self::Dead),
            _ => Err(StorageError::Corrupt(format!("invalid pending status: {s}"))),
        }
    }
}

/// A message that failed immediate delivery and awaits retry.
///
/// Rows are immutable in the baseline lifecycle: created on a failed
/// immediate attempt, deleted after a successful retry. The bounded-retry
/// mode is the single exception (it increments `attempts`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingMessage {
    /// Unique database ID, assigned on insert.
    pub id: i64,
    /// Recipient identifier within the channel's namespace.
    pub recipient: String,
    /// Fully rendered message body.
    pub payload: String,
    /// Current queue status.
    pub status: PendingStatus,
    /// Number of failed retries. Stays 0 unless retries are bounded.
    pub attempts: i64,
    /// Most recent failure, if any retry has been recorded.
    pub last_error: Option<String>,
    /// Unix timestamp of insertion, used for ordering.
    pub created_at_epoch: i64,
}

/// Counts of queue rows by status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QueueStats {
    /// Messages waiting for a retry cycle.
    pub queued: u64,
    /// Dead-lettered messages.
    pub dead: u64,
}
