//! Request-size and role gating tests for eventrec-server

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use eventrec_common::db::SqliteEventStore;
use eventrec_common::media::MediaUploader;
use eventrec_common::notify::NotificationBus;
use eventrec_common::report::ReportExporter;
use eventrec_common::{EventRepository, Result};
use eventrec_server::api::media::MEDIA_BODY_LIMIT;
use eventrec_server::api::{ROLE_HEADER, USER_HEADER};
use eventrec_server::{build_router, AppState};
use tower::util::ServiceExt;

struct AcceptingUploader;

#[async_trait]
impl MediaUploader for AcceptingUploader {
    async fn upload(&self, name: &str, _mime_type: &str, _bytes: Vec<u8>) -> Result<String> {
        Ok(format!("https://files.example/{}", name))
    }
}

/// Test helper: app over an in-memory store; reports go to the OS temp dir
async fn setup_app() -> axum::Router {
    let store = SqliteEventStore::open_in_memory().await.unwrap();
    let repository = Arc::new(EventRepository::new(Arc::new(store), NotificationBus::new(16)));
    let reports_dir = std::env::temp_dir().join("eventrec-security-tests");
    let exporter = ReportExporter::new(reports_dir, "Test");
    build_router(AppState::new(repository, exporter, Arc::new(AcceptingUploader)))
}

fn media_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/media")
        .header("Content-Type", "application/json")
        .header(USER_HEADER, "asha")
        .header(ROLE_HEADER, "edit")
        .body(Body::from(body))
        .unwrap()
}

fn media_body(payload_len: usize) -> String {
    format!(
        r#"{{"name": "big.bin", "type": "application/octet-stream", "data": "{}"}}"#,
        "A".repeat(payload_len)
    )
}

/// Uploads larger than the media body limit are refused before decoding
#[tokio::test]
async fn test_media_body_over_limit_rejected() {
    let app = setup_app().await;

    let response = app
        .oneshot(media_request(media_body(MEDIA_BODY_LIMIT + 1024)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

/// A body bigger than axum's 2 MB default but under the media limit is accepted
#[tokio::test]
async fn test_media_body_under_limit_accepted() {
    let app = setup_app().await;

    // 4 MiB of 'A's is valid base64 (3 MiB of zero bytes)
    let response = app
        .oneshot(media_request(media_body(4 * 1024 * 1024)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

/// Role header casing and padding do not matter
#[tokio::test]
async fn test_role_header_is_case_insensitive() {
    let app = setup_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/categories")
        .header("Content-Type", "application/json")
        .header(USER_HEADER, "asha")
        .header(ROLE_HEADER, " EDIT ")
        .body(Body::from(r#"{"name": "Workshop"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

/// Blank user names do not open a session
#[tokio::test]
async fn test_blank_user_is_login_required() {
    let app = setup_app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/dashboard")
        .header(USER_HEADER, "   ")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
