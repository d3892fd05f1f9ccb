//! Integration tests for continuous recording over HTTP
//!
//! Start/stop/status are driven through the router; the mock camera's
//! segmented capture is a real `sleep` process, so these run on Unix only.

#![cfg(unix)]

use std::time::Duration;

use axum::http::{Method, StatusCode};
use camweb::camera::mock::MockConfig;
use camweb::StartPolicy;

use super::common::harness::TestApp;

async fn wait_until_idle(app: &TestApp) -> bool {
    for _ in 0..50 {
        let (_, json) = app.json(Method::GET, "/api/status").await;
        if json["recording"] == false {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    false
}

/// Start, record some segments, stop: the gallery ends up with playable files only
#[tokio::test]
async fn test_full_recording_cycle() {
    let app = TestApp::new();

    let (status, json) = app.json(Method::POST, "/api/start").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["pattern"].as_str().unwrap().ends_with("_%04d.h264"));

    let (_, json) = app.json(Method::GET, "/api/status").await;
    assert_eq!(json["recording"], true);
    assert_eq!(app.files_with_ext("h264").len(), 1);
    // Raw segments are never listed
    assert!(app.listed().await.is_empty());

    let (status, json) = app.json(Method::POST, "/api/stop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["was_recording"], true);
    assert_eq!(json["failed"], 0);

    assert!(app.files_with_ext("h264").is_empty());
    assert_eq!(app.files_with_ext("mp4").len(), 1);
    assert_eq!(app.listed().await, app.files_with_ext("mp4"));
    assert!(wait_until_idle(&app).await);
}

/// A second start is refused and the first session keeps running
#[tokio::test]
async fn test_double_start_is_rejected() {
    let app = TestApp::new();

    let (status, _) = app.json(Method::POST, "/api/start").await;
    assert_eq!(status, StatusCode::OK);
    let pid = app.state.core().recordings().active_pid().await;

    let (status, json) = app.json(Method::POST, "/api/start").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["details"].as_str().is_some());

    assert_eq!(app.state.core().recordings().active_pid().await, pid);
    assert_eq!(app.runner.segmented_starts(), 1);

    app.json(Method::POST, "/api/stop").await;
}

/// Under the restart policy a second start replaces the running session
#[tokio::test]
async fn test_restart_policy_replaces_session() {
    let app = TestApp::with(MockConfig::default(), StartPolicy::Restart);

    app.json(Method::POST, "/api/start").await;
    let first = app.state.core().recordings().active_pid().await;

    let (status, _) = app.json(Method::POST, "/api/start").await;
    assert_eq!(status, StatusCode::OK);
    let second = app.state.core().recordings().active_pid().await;

    assert!(first.is_some() && second.is_some());
    assert_ne!(first, second);
    assert_eq!(app.runner.segmented_starts(), 2);

    app.json(Method::POST, "/api/stop").await;
    assert!(app.files_with_ext("h264").is_empty());
    assert!(!app.files_with_ext("mp4").is_empty());
}

/// Concurrent start requests yield exactly one recording process
#[tokio::test]
async fn test_concurrent_start_requests() {
    let app = TestApp::new();

    let results =
        futures::future::join_all((0..6).map(|_| app.json(Method::POST, "/api/start"))).await;

    let ok = results.iter().filter(|(s, _)| *s == StatusCode::OK).count();
    let conflict = results
        .iter()
        .filter(|(s, _)| *s == StatusCode::CONFLICT)
        .count();
    assert_eq!(ok, 1);
    assert_eq!(conflict, 5);
    assert_eq!(app.runner.segmented_starts(), 1);

    app.json(Method::POST, "/api/stop").await;
}

/// A recorder that exits by itself is noticed and a new start is allowed
#[tokio::test]
async fn test_recorder_exit_is_detected() {
    let app = TestApp::with(
        MockConfig::default().with_segment_lifetime(Duration::from_millis(200)),
        StartPolicy::Reject,
    );

    let (status, _) = app.json(Method::POST, "/api/start").await;
    assert_eq!(status, StatusCode::OK);
    assert!(wait_until_idle(&app).await);

    let (status, _) = app.json(Method::POST, "/api/start").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.runner.segmented_starts(), 2);

    app.json(Method::POST, "/api/stop").await;
}

/// Photos and timed clips work while a continuous recording runs
#[tokio::test]
async fn test_captures_during_recording() {
    let app = TestApp::new();
    app.json(Method::POST, "/api/start").await;

    let (_, snap) = app.json(Method::POST, "/api/snap").await;
    let (_, clip) = app.json(Method::POST, "/api/record/1").await;
    let photo = snap["file"].as_str().unwrap().to_string();
    let video = clip["file"].as_str().unwrap().to_string();

    let (_, json) = app.json(Method::POST, "/api/stop").await;
    let converted: Vec<_> = json["converted"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(converted.len(), 1);
    assert!(!converted.contains(&video));

    let listed = app.listed().await;
    assert!(listed.contains(&photo));
    assert!(listed.contains(&video));
    assert_eq!(listed.len(), 3);
}

/// Shutdown stops the recorder and converts what it wrote
#[tokio::test]
async fn test_shutdown_stops_and_converts() {
    let app = TestApp::new();
    app.json(Method::POST, "/api/start").await;
    let pid = app
        .state
        .core()
        .recordings()
        .active_pid()
        .await
        .expect("recording running");

    app.state.core().recordings().shutdown().await;

    assert!(app.state.core().recordings().active_pid().await.is_none());
    assert!(app.files_with_ext("h264").is_empty());
    assert_eq!(app.files_with_ext("mp4").len(), 1);
    // The recorder process is gone
    let alive = unsafe { libc::kill(pid as libc::pid_t, 0) } == 0;
    assert!(!alive);
}
