//! Delivery logic for courier.
//!
//! Centralizes the delivery attempter, the ingestion submit path, and the
//! retry scheduler between the HTTP layer and the channel/storage crates.

mod delivery;
mod error;
mod notification;
mod render;
mod retry;

pub use delivery::{DeliveryOutcome, DeliveryService};
pub use error::ServiceError;
pub use notification::{NotificationService, SendDisposition};
pub use render::render_message;
pub use retry::{CycleOutcome, CycleReport, RetryConfig, RetryWorker};
