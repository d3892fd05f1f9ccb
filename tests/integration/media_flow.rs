//! Integration tests for capture and the media gallery
//!
//! Covers the photo/clip capture endpoints, listing, serving and deleting
//! files, and the path checks in front of the recordings directory.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use camweb::camera::mock::{MockConfig, MOCK_JPEG};
use camweb::StartPolicy;
use http_body_util::BodyExt;
use tower::ServiceExt;

use super::common::harness::TestApp;

/// Snap a photo, see it in the gallery, download it, delete it
#[tokio::test]
async fn test_photo_lifecycle() {
    let app = TestApp::new();

    let (status, json) = app.json(Method::POST, "/api/snap").await;
    assert_eq!(status, StatusCode::OK);
    let name = json["file"].as_str().unwrap().to_string();
    assert!(name.starts_with("photo_") && name.ends_with(".jpg"));

    assert_eq!(app.listed().await, vec![name.clone()]);

    let (status, body) = app.raw(Method::GET, &format!("/media/{}", name)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, MOCK_JPEG);

    let (status, json) = app
        .json(Method::POST, &format!("/api/delete/{}", name))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Deleted");
    assert!(app.listed().await.is_empty());

    let (status, _) = app.raw(Method::GET, &format!("/media/{}", name)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// A timed clip is listed as a video and no raw file is left behind
#[tokio::test]
async fn test_clip_is_converted() {
    let app = TestApp::new();

    let (status, json) = app.json(Method::GET, "/record?duration=2").await;
    assert_eq!(status, StatusCode::OK);
    let name = json["file"].as_str().unwrap().to_string();

    assert!(app.files_with_ext("h264").is_empty());
    let (_, list) = app.json(Method::GET, "/api/list").await;
    assert_eq!(list["files"][0]["name"], name.as_str());
    assert_eq!(list["files"][0]["type"], "video");
}

/// Tool failures answer 200 with a "Failed" message and no file
#[tokio::test]
async fn test_capture_failures_are_reported_in_body() {
    let app = TestApp::with(
        MockConfig::default().failing_still().failing_convert(),
        StartPolicy::Reject,
    );

    let (status, json) = app.json(Method::POST, "/api/snap").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().starts_with("Failed"));
    assert!(json["file"].is_null());

    let (status, json) = app.json(Method::POST, "/api/record/1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["file"].is_null());
    assert!(app.listed().await.is_empty());
}

/// Video files are served with range support for seeking
#[tokio::test]
async fn test_media_range_request() {
    let app = TestApp::new();
    std::fs::write(app.recordings.join("video_1.mp4"), b"0123456789").unwrap();

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/file/video_1.mp4")
                .header(header::RANGE, "bytes=2-5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"2345");
}

/// Names that would leave the recordings directory are treated as missing
#[tokio::test]
async fn test_paths_outside_recordings_are_not_found() {
    let app = TestApp::new();
    let secret = app.parent().join("secret.jpg");
    std::fs::write(&secret, b"secret").unwrap();

    for uri in [
        "/api/delete/..%2Fsecret.jpg",
        "/delete/..%2Fsecret.jpg",
        "/api/delete/..",
        "/api/delete/%2Fetc%2Fpasswd",
    ] {
        let (status, json) = app.json(Method::POST, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(json["error"], "Not found");
    }

    for uri in ["/media/..%2Fsecret.jpg", "/file/..%5Csecret.jpg"] {
        let (status, _) = app.raw(Method::GET, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }

    assert!(secret.exists());
}

/// The gallery ignores files it cannot show
#[tokio::test]
async fn test_listing_skips_unknown_files() {
    let app = TestApp::new();
    std::fs::write(app.recordings.join("notes.txt"), b"x").unwrap();
    std::fs::write(app.recordings.join("video_1_0000.h264"), b"x").unwrap();
    std::fs::write(app.recordings.join("photo_1.jpg"), MOCK_JPEG).unwrap();

    assert_eq!(app.listed().await, vec!["photo_1.jpg".to_string()]);
}
