/// Common test utilities for integration tests
///
/// Builds the full router on top of an `InMemoryUserStore` and provides
/// helpers for sending requests and decoding JSON responses.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use userhub_api::app::{build_router, AppState};
use userhub_api::config::Config;
use userhub_shared::store::memory::InMemoryUserStore;

/// Test context holding the router and direct store access
pub struct TestContext {
    pub app: axum::Router,
    pub store: Arc<InMemoryUserStore>,
}

impl TestContext {
    /// Creates a context with an empty store
    pub fn new() -> Self {
        let store = Arc::new(InMemoryUserStore::new());
        let state = AppState::new(store.clone(), Config::in_memory());

        Self {
            app: build_router(state),
            store,
        }
    }

    /// Sends a request and returns status plus decoded JSON body
    ///
    /// Empty bodies decode to `Value::Null`.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request("POST", uri, body)).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request("PUT", uri, body)).await
    }

    /// Creates a user through the API and returns the response body
    pub async fn create_user(&self, name: &str, email: &str) -> Value {
        let (status, body) = self
            .post_json("/users", serde_json::json!({ "name": name, "email": email }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
