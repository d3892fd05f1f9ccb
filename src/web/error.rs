//! Web error types for the camweb server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::camera::CameraError;
use crate::media::MediaError;

/// Error type for web API operations.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request with validation error.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Conflict error (e.g., a recording is already running).
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match &self {
            // No details: a rejected traversal must look like a missing file
            WebError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, "Not found", None)
            }
            WebError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad Request", Some(msg.clone()))
            }
            WebError::Internal(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    None,
                )
            }
            WebError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", Some(msg.clone())),
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

impl From<MediaError> for WebError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::NotFound(name) => WebError::NotFound(name),
            MediaError::Io(e) => WebError::Internal(e.to_string()),
        }
    }
}

impl From<CameraError> for WebError {
    fn from(err: CameraError) -> Self {
        match err {
            CameraError::AlreadyRecording => WebError::Conflict(err.to_string()),
            CameraError::InvalidDuration { .. } => WebError::BadRequest(err.to_string()),
            other => WebError::Internal(other.to_string()),
        }
    }
}
