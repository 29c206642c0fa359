mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{build_test_app, send};
use dmf_storage::MemoryEventStore;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: GET /health returns status and version
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_ok_and_version() {
    let app = build_test_app(Arc::new(MemoryEventStore::new()));

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

// ---------------------------------------------------------------------------
// Test: responses carry a generated x-request-id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_has_request_id() {
    let app = build_test_app(Arc::new(MemoryEventStore::new()));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header");
    assert!(!id.is_empty());
}

// ---------------------------------------------------------------------------
// Test: unknown routes are 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = build_test_app(Arc::new(MemoryEventStore::new()));

    let request = Request::builder()
        .uri("/api/v1/projects")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
