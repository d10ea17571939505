//! Status watcher: turns gateway probes into lifecycle events.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::adapter::ChannelAdapter;
use crate::state::ChannelEvent;
use crate::transport::{ChannelProbe, ProbeState};

fn probe_events(probe: ChannelProbe) -> Vec<ChannelEvent> {
    let mut events = Vec::with_capacity(2);
    if let Some(qr) = probe.qr {
        events.push(ChannelEvent::QrChallenge(qr));
    }
    match probe.state {
        ProbeState::Ready => events.push(ChannelEvent::Ready),
        ProbeState::Disconnected => events.push(ChannelEvent::Disconnected(
            probe.reason.unwrap_or_else(|| "gateway reported disconnected".to_owned()),
        )),
        ProbeState::AuthFailed => events.push(ChannelEvent::AuthFailure(
            probe.reason.unwrap_or_else(|| "gateway reported auth failure".to_owned()),
        )),
        ProbeState::Pending => {},
    }
    events
}

/// Spawn the task that polls the gateway status on `interval` and feeds
/// the resulting events into the adapter.
///
/// A probe transport failure counts as `Disconnected`: if the gateway is
/// unreachable the channel is unusable, and the scheduler must stop
/// draining until a later probe reports it back.
pub fn spawn_status_watcher(
    adapter: Arc<ChannelAdapter>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {},
            }
            match adapter.probe().await {
                Ok(probe) => {
                    for event in probe_events(probe) {
                        adapter.handle_event(event);
                    }
                },
                Err(e) => {
                    adapter.handle_event(ChannelEvent::Disconnected(e.to_string()));
                },
            }
        }
        tracing::info!("status watcher stopped");
    })
}
