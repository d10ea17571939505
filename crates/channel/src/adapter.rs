//! The channel adapter: transport handle + readiness state machine.

use std::sync::{Arc, RwLock};

use tokio::sync::watch;

use crate::state::{ChannelEvent, ChannelState};
use crate::transport::{ChannelProbe, ChannelTransport};
use crate::ChannelError;

/// Wraps the external send capability and tracks readiness.
///
/// State changes are published through a `watch` channel so subscribers
/// (the retry scheduler, the status endpoint) observe the current state
/// without polling the adapter.
pub struct ChannelAdapter {
    transport: Arc<dyn ChannelTransport>,
    state_tx: watch::Sender<ChannelState>,
    last_qr: RwLock<Option<String>>,
}

impl ChannelAdapter {
    /// New adapter in `Uninitialized`.
    #[must_use]
    pub fn new(transport: Arc<dyn ChannelTransport>) -> Self {
        let (state_tx, _) = watch::channel(ChannelState::Uninitialized);
        Self { transport, state_tx, last_qr: RwLock::new(None) }
    }

    /// Begin the channel lifecycle. Issued by startup before the HTTP
    /// listener binds; readiness signals arrive asynchronously afterwards.
    pub fn initialize(&self) {
        let moved = self.state_tx.send_if_modified(|state| {
            if *state == ChannelState::Uninitialized {
                *state = ChannelState::Initializing;
                true
            } else {
                false
            }
        });
        if moved {
            tracing::info!("channel initializing");
        }
    }

    /// Current readiness state.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        *self.state_tx.borrow()
    }

    /// Subscribe to readiness changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ChannelState> {
        self.state_tx.subscribe()
    }

    /// The pairing challenge from the most recent probe, if one is open.
    #[must_use]
    pub fn pending_qr(&self) -> Option<String> {
        self.last_qr.read().ok().and_then(|qr| qr.as_ref().cloned())
    }

    /// Feed one lifecycle signal through the state machine.
    pub fn handle_event(&self, event: ChannelEvent) {
        match &event {
            ChannelEvent::QrChallenge(data) => {
                tracing::info!(
                    qr = %data,
                    "pairing challenge received; complete authentication out-of-band"
                );
                if let Ok(mut qr) = self.last_qr.write() {
                    *qr = Some(data.clone());
                }
            },
            ChannelEvent::Ready => {
                if let Ok(mut qr) = self.last_qr.write() {
                    *qr = None;
                }
            },
            ChannelEvent::AuthFailure(_) | ChannelEvent::Disconnected(_) => {},
        }

        let mut entered = None;
        self.state_tx.send_if_modified(|state| {
            let next = state.apply(&event);
            if next == *state {
                false
            } else {
                *state = next;
                entered = Some(next);
                true
            }
        });

        match (entered, &event) {
            (Some(ChannelState::Ready), _) => tracing::info!("channel ready"),
            (Some(ChannelState::Disconnected), ChannelEvent::Disconnected(reason)) => {
                tracing::warn!(reason = %reason, "channel disconnected");
            },
            (Some(ChannelState::AuthFailed), ChannelEvent::AuthFailure(reason)) => {
                tracing::error!(
                    reason = %reason,
                    "channel authentication failed; operator intervention required"
                );
            },
            _ => {},
        }
    }

    /// Attempt a send regardless of the current readiness state.
    ///
    /// An attempt made while not `Ready` is expected to fail fast with a
    /// [`ChannelError`]; every send is authoritative about reachability,
    /// so the adapter never second-guesses it.
    pub async fn send(&self, recipient: &str, payload: &str) -> Result<(), ChannelError> {
        self.transport.send_text(recipient, payload).await
    }

    /// One status observation, for the watcher task.
    pub async fn probe(&self) -> Result<ChannelProbe, ChannelError> {
        self.transport.probe().await
    }

    /// Detach on shutdown. The gateway owns the authenticated session and
    /// must survive courier restarts, so this terminates nothing remote.
    pub fn release(&self) {
        tracing::info!(state = %self.state().as_str(), "channel adapter released");
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct NullTransport;

    #[async_trait]
    impl ChannelTransport for NullTransport {
        async fn send_text(&self, _recipient: &str, _body: &str) -> Result<(), ChannelError> {
            Err(ChannelError::Unavailable("null transport".to_owned()))
        }

        async fn probe(&self) -> Result<ChannelProbe, ChannelError> {
            Err(ChannelError::Unavailable("null transport".to_owned()))
        }
    }

    fn adapter() -> ChannelAdapter {
        ChannelAdapter::new(Arc::new(NullTransport))
    }

    #[test]
    fn test_initialize_moves_out_of_uninitialized() {
        let adapter = adapter();
        assert_eq!(adapter.state(), ChannelState::Uninitialized);
        adapter.initialize();
        assert_eq!(adapter.state(), ChannelState::Initializing);
    }

    #[test]
    fn test_subscribers_observe_transitions() {
        let adapter = adapter();
        let rx = adapter.subscribe();
        adapter.initialize();
        adapter.handle_event(ChannelEvent::Ready);
        assert_eq!(*rx.borrow(), ChannelState::Ready);
    }

    #[test]
    fn test_qr_is_surfaced_and_cleared_on_ready() {
        let adapter = adapter();
        adapter.initialize();
        adapter.handle_event(ChannelEvent::QrChallenge("scan-me".to_owned()));
        assert_eq!(adapter.state(), ChannelState::Initializing);
        assert_eq!(adapter.pending_qr().as_deref(), Some("scan-me"));

        adapter.handle_event(ChannelEvent::Ready);
        assert!(adapter.pending_qr().is_none());
    }

    #[tokio::test]
    async fn test_send_is_attempted_in_any_state() {
        let adapter = adapter();
        // Never initialized, yet the attempt is delegated and fails fast.
        let result = adapter.send("5551234", "hello").await;
        assert!(matches!(result, Err(ChannelError::Unavailable(_))));
    }
}
