//! Channel adapter for courier.
//!
//! Wraps the external send capability behind [`ChannelTransport`] and owns
//! the readiness state machine. The production transport is an HTTP
//! gateway fronting the real messaging channel; the gateway owns the
//! authenticated session, courier only drives sends and watches status.

mod adapter;
mod error;
mod gateway;
mod state;
mod transport;
mod watcher;

pub use adapter::ChannelAdapter;
pub use error::ChannelError;
pub use gateway::HttpGateway;
pub use state::{ChannelEvent, ChannelState};
pub use transport::{ChannelProbe, ChannelTransport, ProbeState};
pub use watcher::spawn_status_watcher;
