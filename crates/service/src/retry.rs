//! The retry scheduler.

use std::sync::Arc;
use std::time::Duration;

use courier_channel::ChannelState;
use courier_storage::{PendingStore, StorageError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::delivery::{DeliveryOutcome, DeliveryService};

/// Tuning for the retry scheduler.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Period between cycles.
    pub interval: Duration,
    /// Maximum entries processed per cycle. Bounds channel load even
    /// under a large backlog.
    pub batch_limit: usize,
    /// Failed retries before dead-lettering. 0 = retry forever.
    pub max_attempts: u32,
}

/// What one scheduled pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Channel not ready; the store was not touched.
    Skipped,
    /// A batch was processed.
    Completed(CycleReport),
}

/// Per-cycle counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Entries fetched this cycle.
    pub fetched: usize,
    /// Entries delivered and removed.
    pub delivered: usize,
    /// Entries that failed again and stay queued.
    pub failed: usize,
}

/// Periodically drains a bounded batch of pending messages while the
/// channel is ready.
///
/// One worker task runs all cycles, so two cycles can never overlap; a
/// cycle that outlives the interval delays the next tick instead of
/// stacking.
pub struct RetryWorker {
    delivery: DeliveryService,
    store: Arc<dyn PendingStore>,
    channel_state: watch::Receiver<ChannelState>,
    config: RetryConfig,
    cancel: CancellationToken,
}

impl RetryWorker {
    #[must_use]
    pub fn new(
        delivery: DeliveryService,
        store: Arc<dyn PendingStore>,
        channel_state: watch::Receiver<ChannelState>,
        config: RetryConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self { delivery, store, channel_state, config, cancel }
    }

    /// Run cycles until cancelled. Returns `Err` only on a storage fault,
    /// which the caller must treat as fatal; continuing would leave the
    /// queue silently undrained.
    pub async fn run(mut self) -> Result<(), StorageError> {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick of a tokio interval fires immediately; consume it
        // so the first cycle happens one full period after startup.
        ticker.tick().await;
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    tracing::info!("retry scheduler stopped");
                    return Ok(());
                },
                _ = ticker.tick() => {},
            }
            match self.run_cycle().await {
                Ok(CycleOutcome::Skipped) => {},
                Ok(CycleOutcome::Completed(report)) if report.fetched > 0 => {
                    tracing::info!(
                        fetched = report.fetched,
                        delivered = report.delivered,
                        failed = report.failed,
                        "retry cycle finished"
                    );
                },
                Ok(CycleOutcome::Completed(_)) => {},
                Err(e) => {
                    tracing::error!(error = %e, "storage fault in retry cycle, halting scheduler");
                    return Err(e);
                },
            }
        }
    }

    /// One scheduled pass over the queue.
    ///
    /// Channel failures are absorbed (logged, next entry); storage
    /// failures escalate. Shutdown is honored between attempts, never
    /// mid-attempt. An attempt in flight at shutdown may still deliver,
    /// which is the accepted duplicate-delivery window of at-least-once
    /// semantics.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, StorageError> {
        if *self.channel_state.borrow() != ChannelState::Ready {
            return Ok(CycleOutcome::Skipped);
        }

        let batch = self.store.fetch_oldest(self.config.batch_limit).await?;
        let mut report = CycleReport { fetched: batch.len(), ..CycleReport::default() };

        for entry in batch {
            if self.cancel.is_cancelled() {
                break;
            }
            match self.delivery.attempt(&entry.recipient, &entry.payload).await {
                DeliveryOutcome::Delivered => {
                    self.store.delete(entry.id).await?;
                    report.delivered += 1;
                    tracing::info!(id = entry.id, recipient = %entry.recipient, "redelivered");
                },
                DeliveryOutcome::Failed(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        id = entry.id,
                        recipient = %entry.recipient,
                        error = %e,
                        "retry failed, entry stays queued"
                    );
                    if self.config.max_attempts > 0 {
                        self.store
                            .record_failure(entry.id, &e.to_string(), self.config.max_attempts)
                            .await?;
                    }
                },
            }
        }

        Ok(CycleOutcome::Completed(report))
    }
}
