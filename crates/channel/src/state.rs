//! Readiness state machine.

use serde::{Deserialize, Serialize};

/// Readiness of the channel for delivery.
///
/// `AuthFailed` is terminal: the session credentials are gone and only an
/// operator can recover it. `Disconnected → Ready` happens autonomously
/// when the gateway reports itself back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    /// No initialization has been issued yet.
    Uninitialized,
    /// Initialization issued; waiting for the first ready signal.
    Initializing,
    /// Usable for delivery. The only state the retry scheduler acts in.
    Ready,
    /// Temporarily unusable; may return to `Ready` on its own.
    Disconnected,
    /// Authentication lost. Terminal; operator intervention required.
    AuthFailed,
}

impl ChannelState {
    /// Returns the string representation of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Disconnected => "disconnected",
            Self::AuthFailed => "auth_failed",
        }
    }
}

/// Asynchronous lifecycle signal from the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The channel became usable.
    Ready,
    /// The session authentication failed.
    AuthFailure(String),
    /// The channel dropped; it may recover on its own.
    Disconnected(String),
    /// Out-of-band pairing challenge for the operator. Never changes state.
    QrChallenge(String),
}

impl ChannelState {
    /// The single transition function.
    ///
    /// Events that do not apply in the current state leave it unchanged;
    /// in particular nothing leaves `AuthFailed`, and a disconnect before
    /// initialization has been issued is meaningless noise.
    #[must_use]
    pub fn apply(self, event: &ChannelEvent) -> Self {
        match (self, event) {
            (Self::AuthFailed, _) => Self::AuthFailed,
            (_, ChannelEvent::QrChallenge(_)) => self,
            (Self::Uninitialized, _) => Self::Uninitialized,
            (_, ChannelEvent::Ready) => Self::Ready,
            (_, ChannelEvent::AuthFailure(_)) => Self::AuthFailed,
            (_, ChannelEvent::Disconnected(_)) => Self::Disconnected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> ChannelEvent {
        ChannelEvent::Ready
    }

    fn auth_failure() -> ChannelEvent {
        ChannelEvent::AuthFailure("bad session".to_owned())
    }

    fn disconnected() -> ChannelEvent {
        ChannelEvent::Disconnected("socket closed".to_owned())
    }

    fn qr() -> ChannelEvent {
        ChannelEvent::QrChallenge("qr-data".to_owned())
    }

    #[test]
    fn test_happy_path() {
        let state = ChannelState::Initializing.apply(&ready());
        assert_eq!(state, ChannelState::Ready);
    }

    #[test]
    fn test_disconnect_and_recover() {
        let state = ChannelState::Ready.apply(&disconnected());
        assert_eq!(state, ChannelState::Disconnected);
        assert_eq!(state.apply(&ready()), ChannelState::Ready);
    }

    #[test]
    fn test_auth_failed_is_terminal() {
        let state = ChannelState::Ready.apply(&auth_failure());
        assert_eq!(state, ChannelState::AuthFailed);
        assert_eq!(state.apply(&ready()), ChannelState::AuthFailed);
        assert_eq!(state.apply(&disconnected()), ChannelState::AuthFailed);
        assert_eq!(state.apply(&qr()), ChannelState::AuthFailed);
    }

    #[test]
    fn test_auth_failure_from_initializing() {
        assert_eq!(ChannelState::Initializing.apply(&auth_failure()), ChannelState::AuthFailed);
    }

    #[test]
    fn test_qr_challenge_never_changes_state() {
        for state in [
            ChannelState::Uninitialized,
            ChannelState::Initializing,
            ChannelState::Ready,
            ChannelState::Disconnected,
        ] {
            assert_eq!(state.apply(&qr()), state);
        }
    }

    #[test]
    fn test_uninitialized_ignores_signals() {
        assert_eq!(ChannelState::Uninitialized.apply(&ready()), ChannelState::Uninitialized);
        assert_eq!(
            ChannelState::Uninitialized.apply(&disconnected()),
            ChannelState::Uninitialized
        );
    }
}
