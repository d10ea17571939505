//! Ingestion HTTP API for courier.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]

mod api_error;
mod api_types;
mod handlers;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use courier_channel::ChannelAdapter;
use courier_service::NotificationService;
use courier_storage::PendingStore;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

pub use api_error::ApiError;
pub use api_types::{
    ChannelStatusResponse, PurgeDeadResponse, QueueResponse, RequeueDeadResponse, SendRequest,
    SendResponse,
};

/// Shared application state for all HTTP handlers.
pub struct AppState {
    /// Ingestion submit path.
    pub notifications: NotificationService,
    /// Queue inspection and dead-letter operations.
    pub store: Arc<dyn PendingStore>,
    /// Readiness and QR surface.
    pub adapter: Arc<ChannelAdapter>,
    /// Tripped on a storage fault; the process must stop rather than
    /// continue silently lossy.
    pub fatal: CancellationToken,
}

/// Build the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/send", post(handlers::send))
        .route("/health", get(handlers::health))
        .route("/api/channel", get(handlers::channel_status))
        .route("/api/queue", get(handlers::queue))
        .route("/api/queue/requeue-dead", post(handlers::requeue_dead))
        .route("/api/queue/dead", delete(handlers::purge_dead))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
