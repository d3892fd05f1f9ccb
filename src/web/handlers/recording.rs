//! Continuous recording handlers.

use axum::{extract::State, Json};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::camera::{CameraError, RecordingStatus, StopOutcome};
use crate::web::error::WebError;
use crate::web::state::WebAppState;

#[derive(Debug, Serialize)]
pub struct StartRecordingResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StopRecordingResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub outcome: StopOutcome,
}

/// Begin continuous segmented recording.
///
/// 409 when a recording is already running and the start policy is reject.
pub async fn start_recording(
    State(state): State<WebAppState>,
) -> Result<Json<StartRecordingResponse>, WebError> {
    match state.core().recordings().start().await {
        Ok(started) => Ok(Json(StartRecordingResponse {
            message: "Recording started".to_string(),
            started_at: Some(started.started_at),
            pattern: Some(started.pattern),
        })),
        Err(e @ CameraError::AlreadyRecording) => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to start recording");
            Ok(Json(StartRecordingResponse {
                message: format!("Failed: {}", e),
                started_at: None,
                pattern: None,
            }))
        }
    }
}

/// Stop continuous recording and convert pending segments.
pub async fn stop_recording(State(state): State<WebAppState>) -> Json<StopRecordingResponse> {
    let outcome = state.core().recordings().stop().await;
    Json(StopRecordingResponse {
        message: "Recording stopped",
        outcome,
    })
}

/// Whether a continuous recording is running.
pub async fn recording_status(State(state): State<WebAppState>) -> Json<RecordingStatus> {
    Json(state.core().recordings().status().await)
}
