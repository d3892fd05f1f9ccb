//! Live MJPEG preview handler.

use std::collections::VecDeque;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::header,
    response::Response,
};
use futures::{stream, Stream, StreamExt};
use tokio::process::{Child, ChildStdout};
use tokio_util::io::ReaderStream;

use crate::camera::preview::{multipart_part, MjpegSplitter, CONTENT_TYPE};
use crate::web::error::WebError;
use crate::web::state::WebAppState;

/// Stream the camera as `multipart/x-mixed-replace` JPEG frames.
///
/// Each request runs its own preview process; it is killed when the
/// client disconnects or the server shuts down.
pub async fn stream_preview(State(state): State<WebAppState>) -> Result<Response, WebError> {
    let mut child = state
        .core()
        .runner()
        .spawn_preview()
        .map_err(|e| WebError::Internal(format!("Failed to start preview: {}", e)))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| WebError::Internal("Preview stdout not captured".to_string()))?;

    tracing::debug!(pid = ?child.id(), "Preview started");

    let parts = preview_parts(child, stdout)
        .take_until(state.shutdown_token().clone().cancelled_owned());

    Response::builder()
        .header(header::CONTENT_TYPE, CONTENT_TYPE)
        .header(header::CACHE_CONTROL, "no-cache, no-store")
        .body(Body::from_stream(parts))
        .map_err(|e| WebError::Internal(e.to_string()))
}

/// Multipart parts read from the preview process. The child travels with
/// the stream so dropping the stream kills it.
fn preview_parts(
    child: Child,
    stdout: ChildStdout,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
    let state = (
        child,
        ReaderStream::new(stdout),
        MjpegSplitter::new(),
        VecDeque::<Vec<u8>>::new(),
    );

    stream::unfold(
        state,
        |(child, mut reader, mut splitter, mut pending)| async move {
            loop {
                if let Some(frame) = pending.pop_front() {
                    let part = Bytes::from(multipart_part(&frame));
                    return Some((Ok(part), (child, reader, splitter, pending)));
                }

                match reader.next().await {
                    Some(Ok(chunk)) => pending.extend(splitter.push(&chunk)),
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Failed to read preview output");
                        return Some((Err(e), (child, reader, splitter, pending)));
                    }
                    None => {
                        tracing::debug!("Preview process closed its output");
                        return None;
                    }
                }
            }
        },
    )
}
