//! Shared test helpers for HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use warmup_api::{AppState, build_router};
use warmup_core::config::AppConfig;
use warmup_database::Persistence;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for reaching the pub/sub hub and services directly
    pub state: AppState,
}

impl TestApp {
    /// Create a test application over fresh in-memory stores
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a test application with a tweaked configuration
    pub fn with_config(config: AppConfig) -> Self {
        let state = AppState::build(Arc::new(config), Persistence::in_memory());
        let router = build_router(state.clone());
        Self { router, state }
    }

    /// Register a device through the API
    pub async fn register_device(&self, device_id: &str) {
        let response = self
            .request(
                "POST",
                "/api/android/register",
                Some(json!({ "device_id": device_id })),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Register failed: {:?}",
            response.body
        );
    }

    /// Create a task through the API and return its id
    pub async fn create_task(&self, body: Value) -> String {
        let response = self.request("POST", "/api/tasks", Some(body)).await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Create failed: {:?}",
            response.body
        );
        response.data()["id"]
            .as_str()
            .expect("No id in create response")
            .to_string()
    }

    /// Poll for work as `device_id` and return the dispatched tasks
    pub async fn poll(&self, device_id: &str) -> Vec<Value> {
        let response = self
            .request(
                "GET",
                &format!("/api/android/task/poll?device_id={device_id}"),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Poll failed: {:?}",
            response.body
        );
        response
            .data()
            .as_array()
            .cloned()
            .expect("Poll data is not an array")
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let has_body = body.is_some();
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut builder = Request::builder().method(method).uri(path);
        if has_body {
            builder = builder.header("Content-Type", "application/json");
        }
        let req = builder
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `error` code of an error body
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
