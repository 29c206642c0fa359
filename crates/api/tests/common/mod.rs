use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use dmf_api::config::{ServerConfig, DEFAULT_STATUS_ROUTE};
use dmf_api::router::build_app_router;
use dmf_api::state::AppState;
use dmf_core::event_record::EventRecord;
use dmf_storage::{EventStore, MemoryEventStore, StorageError};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        status_route: DEFAULT_STATUS_ROUTE.to_string(),
    }
}

/// Build the full application router (same middleware stack as `main.rs`)
/// over the given event store.
pub fn build_test_app(events: Arc<dyn EventStore>) -> Router {
    let config = test_config();
    let state = AppState { events };
    build_app_router(state, &config)
}

/// [`MemoryEventStore`] wrapper that counts calls, so tests can assert a
/// write was never attempted.
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryEventStore,
    pub ensure_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
}

impl CountingStore {
    pub fn writes(&self) -> usize {
        self.ensure_calls.load(Ordering::SeqCst) + self.insert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventStore for CountingStore {
    async fn ensure_table(&self) -> Result<(), StorageError> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.ensure_table().await
    }

    async fn insert(&self, record: &EventRecord) -> Result<(), StorageError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(record).await
    }
}

/// Store whose service is always unavailable.
pub struct UnavailableStore;

#[async_trait]
impl EventStore for UnavailableStore {
    async fn ensure_table(&self) -> Result<(), StorageError> {
        Err(StorageError::ApiError {
            status: 403,
            code: Some("AuthenticationFailed".into()),
            body: "Server failed to authenticate the request. Signature: abc123".into(),
        })
    }

    async fn insert(&self, _record: &EventRecord) -> Result<(), StorageError> {
        unreachable!("insert after failed ensure_table")
    }
}

/// POST `body` to the status route and return status plus parsed JSON body.
pub async fn post_event(app: &Router, body: impl Into<Body>) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(DEFAULT_STATUS_ROUTE)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    send(app, request).await
}

/// Send a request through a clone of `app` and parse the JSON response.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
