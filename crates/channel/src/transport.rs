//! The transport seam between the adapter and the real gateway.

use async_trait::async_trait;
use serde::Deserialize;

use crate::ChannelError;

/// External send capability plus a lifecycle signal source.
///
/// Production uses [`crate::HttpGateway`]; tests substitute scripted
/// transports.
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Deliver `body` to `recipient`. Expected to fail fast when the
    /// underlying channel is not usable, never to block.
    async fn send_text(&self, recipient: &str, body: &str) -> Result<(), ChannelError>;

    /// One status observation from the channel.
    async fn probe(&self) -> Result<ChannelProbe, ChannelError>;
}

/// Channel status as reported by one probe.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelProbe {
    /// Coarse channel state.
    pub state: ProbeState,
    /// Human-readable detail for `disconnected` / `auth_failed`.
    #[serde(default)]
    pub reason: Option<String>,
    /// Pairing challenge data, present while the gateway waits for an
    /// operator to authenticate out-of-band.
    #[serde(default)]
    pub qr: Option<String>,
}

/// Wire states a gateway probe can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeState {
    /// Channel usable.
    Ready,
    /// Channel dropped; may come back.
    Disconnected,
    /// Session authentication failed.
    AuthFailed,
    /// Still starting up, pairing, or an unrecognized state.
    #[serde(other)]
    Pending,
}
