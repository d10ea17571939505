//! HTTP handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use courier_service::{SendDisposition, ServiceError};

use crate::api_error::ApiError;
use crate::api_types::{
    ChannelStatusResponse, PurgeDeadResponse, QueueResponse, RequeueDeadResponse, SendRequest,
    SendResponse,
};
use crate::AppState;

const QUEUE_VIEW_LIMIT: usize = 100;

pub async fn send(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendRequest>,
) -> Result<(axum::http::StatusCode, Json<SendResponse>), ApiError> {
    // Validation lives in the service; absent fields become blank and are
    // rejected there, so the 400 message has a single source.
    let name = request.name.unwrap_or_default();
    let number = request.number.unwrap_or_default();
    let order = request.order.unwrap_or_default();

    match state.notifications.submit(&name, &number, &order).await {
        Ok(SendDisposition::Sent) => Ok((
            axum::http::StatusCode::OK,
            Json(SendResponse { status: "sent", id: None }),
        )),
        Ok(SendDisposition::Queued { id }) => Ok((
            axum::http::StatusCode::ACCEPTED,
            Json(SendResponse { status: "queued", id: Some(id) }),
        )),
        Err(ServiceError::InvalidInput(msg)) => Err(ApiError::BadRequest(msg)),
        Err(e) => {
            // A failed enqueue means the delivery guarantee is broken; the
            // process must stop loudly, not keep answering "accepted".
            state.fatal.cancel();
            Err(ApiError::Internal(e))
        },
    }
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn channel_status(State(state): State<Arc<AppState>>) -> Json<ChannelStatusResponse> {
    Json(ChannelStatusResponse {
        state: state.adapter.state().as_str(),
        qr: state.adapter.pending_qr(),
    })
}

pub async fn queue(
    State(state): State<Arc<AppState>>,
) -> Result<Json<QueueResponse>, ApiError> {
    let messages = state
        .store
        .list(QUEUE_VIEW_LIMIT)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    let stats = state.store.stats().await.map_err(|e| ApiError::Internal(e.into()))?;
    Ok(Json(QueueResponse { messages, stats }))
}

pub async fn requeue_dead(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RequeueDeadResponse>, ApiError> {
    let requeued =
        state.store.requeue_dead().await.map_err(|e| ApiError::Internal(e.into()))?;
    tracing::info!(requeued, "dead letters returned to queue");
    Ok(Json(RequeueDeadResponse { requeued }))
}

pub async fn purge_dead(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PurgeDeadResponse>, ApiError> {
    let purged = state.store.purge_dead().await.map_err(|e| ApiError::Internal(e.into()))?;
    tracing::info!(purged, "dead letters purged");
    Ok(Json(PurgeDeadResponse { purged }))
}
