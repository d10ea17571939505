//! Request/response DTOs for the API.

use courier_storage::{PendingMessage, QueueStats};
use serde::{Deserialize, Serialize};

/// Body of `POST /send`.
///
/// Fields are optional at the wire level so a missing field answers 400
/// with a message instead of axum's generic deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
}

/// Body of `POST /send` responses.
#[derive(Debug, Serialize)]
pub struct SendResponse {
    /// `"sent"` or `"queued"`.
    pub status: &'static str,
    /// Store id of the pending entry, present when queued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

/// Body of `GET /api/channel`.
#[derive(Debug, Serialize)]
pub struct ChannelStatusResponse {
    pub state: &'static str,
    /// Open pairing challenge, if the gateway is waiting for an operator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr: Option<String>,
}

/// Body of `GET /api/queue`.
#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub messages: Vec<PendingMessage>,
    pub stats: QueueStats,
}

/// Body of `POST /api/queue/requeue-dead`.
#[derive(Debug, Serialize)]
pub struct RequeueDeadResponse {
    pub requeued: u64,
}

/// Body of `DELETE /api/queue/dead`.
#[derive(Debug, Serialize)]
pub struct PurgeDeadResponse {
    pub purged: u64,
}
