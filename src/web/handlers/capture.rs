//! Photo and fixed-duration recording handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::camera::{CameraError, CapturedMedia};
use crate::web::error::WebError;
use crate::web::state::WebAppState;

/// Default length for `/record` without a duration
const DEFAULT_RECORD_SECS: u64 = 10;

/// Response for a capture request.
///
/// Tool failures still answer 200: `message` starts with "Failed" and
/// `file` is null.
#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    pub message: String,
    pub file: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordQuery {
    pub duration: Option<u64>,
}

fn capture_response(
    what: &str,
    result: Result<CapturedMedia, CameraError>,
) -> Result<Json<CaptureResponse>, WebError> {
    match result {
        Ok(media) => Ok(Json(CaptureResponse {
            message: media.message(),
            file: Some(media.file),
        })),
        Err(e @ CameraError::InvalidDuration { .. }) => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "{} failed", what);
            Ok(Json(CaptureResponse {
                message: format!("Failed: {}", e),
                file: None,
            }))
        }
    }
}

/// Take a photo.
pub async fn snap(State(state): State<WebAppState>) -> Result<Json<CaptureResponse>, WebError> {
    let result = state.core().capture().snap().await;
    capture_response("Photo capture", result)
}

/// Record a clip of `duration` seconds.
pub async fn record(
    State(state): State<WebAppState>,
    Path(duration): Path<u64>,
) -> Result<Json<CaptureResponse>, WebError> {
    let result = state.core().capture().record(duration).await;
    capture_response("Recording", result)
}

/// Record with the duration taken from the query string.
pub async fn record_query(
    State(state): State<WebAppState>,
    Query(query): Query<RecordQuery>,
) -> Result<Json<CaptureResponse>, WebError> {
    let duration = query.duration.unwrap_or(DEFAULT_RECORD_SECS);
    let result = state.core().capture().record(duration).await;
    capture_response("Recording", result)
}
