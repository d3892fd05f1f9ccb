//! In-process camweb fixtures
//!
//! Builds the full router over a [`MockCameraRunner`] and a temporary
//! recordings directory, so tests exercise every layer except the real
//! camera tools.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use camweb::camera::mock::{MockCameraRunner, MockConfig};
use camweb::{build_router, CamwebCore, Config, StartPolicy, ToolAvailability, WebAppState};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

/// A camweb instance over a temporary recordings directory
///
/// The directory is removed when the `TestApp` is dropped.
pub struct TestApp {
    /// TempDir handle (keeps directory alive until dropped)
    dir: TempDir,
    /// Recordings directory served by this instance
    pub recordings: PathBuf,
    pub state: WebAppState,
    pub runner: Arc<MockCameraRunner>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(MockConfig::default(), StartPolicy::Reject)
    }

    pub fn with(mock: MockConfig, policy: StartPolicy) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let recordings = dir.path().join("recordings");

        let config = Config::default()
            .with_recordings_dir(recordings.clone())
            .with_start_policy(policy);
        let runner = Arc::new(MockCameraRunner::new().with_config(mock));
        let core = CamwebCore::with_runner(config, ToolAvailability::default(), runner.clone());

        Self {
            dir,
            recordings,
            state: WebAppState::new(core),
            runner,
        }
    }

    /// Directory containing the recordings directory (outside what is served)
    pub fn parent(&self) -> &Path {
        self.dir.path()
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), false)
    }

    /// Send a request and decode the JSON body (Null for non-JSON bodies)
    pub async fn json(&self, method: Method, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.raw(method, uri).await;
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    /// Send a request and collect the raw body
    pub async fn raw(&self, method: Method, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = self
            .router()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .expect("valid request"),
            )
            .await
            .expect("router is infallible");
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();
        (status, body.to_vec())
    }

    /// Names currently listed by the gallery
    pub async fn listed(&self) -> Vec<String> {
        let (_, json) = self.json(Method::GET, "/api/list").await;
        json["files"]
            .as_array()
            .map(|files| {
                files
                    .iter()
                    .filter_map(|f| f["name"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Files in the recordings directory with the given extension
    pub fn files_with_ext(&self, ext: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.recordings)
            .expect("recordings dir exists")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(&format!(".{}", ext)))
            .collect();
        names.sort();
        names
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
