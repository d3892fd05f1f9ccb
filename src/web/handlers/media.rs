//! Media gallery handlers.

use axum::{
    body::Body,
    extract::{Path, Request, State},
    response::Response,
    Json,
};
use serde::Serialize;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::media::MediaEntry;
use crate::web::error::WebError;
use crate::web::state::WebAppState;

/// Response for listing media.
#[derive(Debug, Serialize)]
pub struct ListMediaResponse {
    pub files: Vec<MediaEntry>,
}

#[derive(Debug, Serialize)]
pub struct DeleteMediaResponse {
    pub message: &'static str,
}

/// List photos and videos, newest first.
pub async fn list_media(
    State(state): State<WebAppState>,
) -> Result<Json<ListMediaResponse>, WebError> {
    let files = state
        .core()
        .media()
        .list()
        .map_err(|e| WebError::Internal(format!("Failed to list recordings: {}", e)))?;

    Ok(Json(ListMediaResponse { files }))
}

/// Delete a file from the recordings directory.
pub async fn delete_media(
    State(state): State<WebAppState>,
    Path(name): Path<String>,
) -> Result<Json<DeleteMediaResponse>, WebError> {
    state.core().media().delete(&name)?;
    Ok(Json(DeleteMediaResponse { message: "Deleted" }))
}

/// Serve the raw bytes of a media file (with range support for video seeking).
pub async fn serve_media(
    State(state): State<WebAppState>,
    Path(name): Path<String>,
    request: Request,
) -> Result<Response, WebError> {
    let path = state.core().media().resolve(&name)?;

    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => Ok(response.map(Body::new)),
        Err(never) => match never {},
    }
}
