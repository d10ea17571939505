//! The delivery attempter.

use std::sync::Arc;

use courier_channel::{ChannelAdapter, ChannelError};

/// Outcome of one delivery attempt.
///
/// Every channel failure classifies uniformly as `Failed`; the retry
/// machinery never distinguishes error subtypes, all failures are
/// retryable.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// The channel accepted the message.
    Delivered,
    /// The attempt failed; the error is kept for logging only.
    Failed(ChannelError),
}

/// Sends one message and classifies the outcome. Stateless; shared by the
/// ingestion path and the retry scheduler.
#[derive(Clone)]
pub struct DeliveryService {
    adapter: Arc<ChannelAdapter>,
}

impl DeliveryService {
    #[must_use]
    pub fn new(adapter: Arc<ChannelAdapter>) -> Self {
        Self { adapter }
    }

    /// Attempt delivery of `payload` to `recipient`, both passed through
    /// verbatim.
    pub async fn attempt(&self, recipient: &str, payload: &str) -> DeliveryOutcome {
        match self.adapter.send(recipient, payload).await {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(e) => DeliveryOutcome::Failed(e),
        }
    }
}
