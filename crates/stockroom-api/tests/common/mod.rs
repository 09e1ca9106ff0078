//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use stockroom_core::event_log::EventLog;
use stockroom_event_store::in_memory_event_log::InMemoryEventLog;
use stockroom_inventory::read_model::InventoryReadModelStore;
use stockroom_test_support::FixedClock;
use tower::ServiceExt;

use stockroom_api::state::AppState;

/// Build state over `event_log` with a fresh read model and a fixed clock.
pub fn app_state(event_log: Arc<dyn EventLog>) -> AppState {
    AppState::new(
        Arc::new(FixedClock::default_instant()),
        event_log,
        Arc::new(InventoryReadModelStore::new()),
    )
}

/// Build the full app router over an in-memory event log. Uses the same
/// route structure as `main.rs`.
pub fn build_test_app() -> Router {
    stockroom_api::app(app_state(Arc::new(InMemoryEventLog::new())))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };
    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}
