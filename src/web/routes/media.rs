//! Top-level routes outside `/api`: media files, the live preview and the
//! short form capture endpoints used by simpler clients.

use axum::{routing::get, Router};

use crate::web::handlers::{capture, media, preview};
use crate::web::state::WebAppState;

pub fn media_routes() -> Router<WebAppState> {
    Router::new()
        .route("/media/{name}", get(media::serve_media))
        .route("/file/{name}", get(media::serve_media))
        .route(
            "/stream",
            get(preview::stream_preview).post(preview::stream_preview),
        )
        .route(
            "/preview",
            get(preview::stream_preview).post(preview::stream_preview),
        )
        .route("/snap", get(capture::snap).post(capture::snap))
        .route(
            "/record",
            get(capture::record_query).post(capture::record_query),
        )
        .route(
            "/delete/{name}",
            get(media::delete_media).post(media::delete_media),
        )
}
