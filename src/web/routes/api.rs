//! REST API route definitions.

use axum::{
    routing::{get, post},
    Router,
};

use crate::web::handlers::{capture, media, recording, system};
use crate::web::state::WebAppState;

/// Build the API router with all REST endpoints (mounted under `/api`).
pub fn api_routes() -> Router<WebAppState> {
    Router::new()
        .route("/health", get(system::health))
        .route("/tools", get(system::list_tools))
        // One-shot capture
        .route("/snap", get(capture::snap).post(capture::snap))
        .route(
            "/record/{duration}",
            get(capture::record).post(capture::record),
        )
        // Continuous recording
        .route("/start", post(recording::start_recording))
        .route("/stop", post(recording::stop_recording))
        .route("/status", get(recording::recording_status))
        // Gallery
        .route("/list", get(media::list_media))
        .route(
            "/delete/{name}",
            get(media::delete_media).post(media::delete_media),
        )
}
