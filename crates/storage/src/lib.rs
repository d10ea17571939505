//! Durable pending-message queue for courier.
//!
//! SQLite-backed FIFO-like store of messages that failed immediate
//! delivery. Every operation here is a single SQL statement, so the
//! ingestion path and the retry cycle share the pool without extra
//! locking.

mod error;
mod sqlite;
mod store;
mod types;

pub use error::StorageError;
pub use sqlite::SqliteStore;
pub use store::PendingStore;
pub use types::{PendingMessage, PendingStatus, QueueStats};
