//! Ingestion submit path.

use std::sync::Arc;

use courier_storage::PendingStore;

use crate::delivery::{DeliveryOutcome, DeliveryService};
use crate::render::render_message;
use crate::ServiceError;

/// What happened to a submitted notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendDisposition {
    /// Delivered on the immediate attempt.
    Sent,
    /// Immediate attempt failed; durably queued for retry under `id`.
    Queued {
        /// Store id of the pending entry.
        id: i64,
    },
}

/// Validates a send request, attempts immediate delivery, and queues the
/// message when the attempt fails.
#[derive(Clone)]
pub struct NotificationService {
    delivery: DeliveryService,
    store: Arc<dyn PendingStore>,
}

impl NotificationService {
    #[must_use]
    pub fn new(delivery: DeliveryService, store: Arc<dyn PendingStore>) -> Self {
        Self { delivery, store }
    }

    /// Handle one send request.
    ///
    /// Validation happens before any side effect: a missing field means no
    /// attempt and no store write. A failed attempt is recovered by
    /// enqueueing. A failed enqueue is a storage fault and propagates:
    /// responding "accepted" without a durable row would break the
    /// delivery guarantee.
    pub async fn submit(
        &self,
        name: &str,
        number: &str,
        order: &str,
    ) -> Result<SendDisposition, ServiceError> {
        validate_field("name", name)?;
        validate_field("number", number)?;
        validate_field("order", order)?;

        let body = render_message(name, order);
        match self.delivery.attempt(number, &body).await {
            DeliveryOutcome::Delivered => Ok(SendDisposition::Sent),
            DeliveryOutcome::Failed(e) => {
                tracing::warn!(
                    recipient = %number,
                    error = %e,
                    "immediate delivery failed, queueing for retry"
                );
                let id = self.store.enqueue(number, &body).await?;
                Ok(SendDisposition::Queued { id })
            },
        }
    }
}

fn validate_field(field: &'static str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidInput(format!("missing required field: {field}")));
    }
    Ok(())
}
