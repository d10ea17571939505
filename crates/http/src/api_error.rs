//! Typed API error for HTTP handlers.
//!
//! Converts service errors into JSON responses with the right status
//! code. Callers of `/send` only ever observe sent / queued / rejected;
//! a storage fault surfaces as a 500 and is escalated by the handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use courier_service::ServiceError;

/// API error with HTTP status code and human-readable message.
///
/// Converts to JSON response: `{"error": "message"}`. `Internal` logs the
/// real error server-side and returns a static message to the client;
/// no detail leakage.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request: missing or blank ingestion field.
    BadRequest(String),
    /// 500 Internal Server Error: storage fault. Details logged, not exposed.
    Internal(ServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            },
        };
        let body = serde_json::json!({"error": message});
        (status, Json(body)).into_response()
    }
}
