//! Route definitions for the warmup HTTP API.
//!
//! Device and operator routes are mounted under `/api`; the WebSocket
//! stream sits at `/ws/{channel}`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(android_routes())
        .merge(task_routes())
        .merge(device_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws/{channel}", get(handlers::ws::ws_upgrade));

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Endpoints polled by the devices themselves
fn android_routes() -> Router<AppState> {
    Router::new()
        .route("/android/register", post(handlers::android::register))
        .route("/android/heartbeat", post(handlers::android::heartbeat))
        .route("/android/task/poll", get(handlers::android::poll))
        .route(
            "/android/task/{id}/complete",
            post(handlers::android::complete),
        )
        .route("/android/task/{id}/fail", post(handlers::android::fail))
}

/// Operator task management
fn task_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tasks",
            get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
        )
        .route("/tasks/batch", post(handlers::tasks::create_batch))
        .route("/tasks/stats", get(handlers::tasks::stats))
        .route("/tasks/purge", post(handlers::tasks::purge))
        .route("/tasks/{id}", get(handlers::tasks::get_task))
        .route("/tasks/{id}/retry", post(handlers::tasks::retry_task))
}

/// Operator device views
fn device_routes() -> Router<AppState> {
    Router::new()
        .route("/devices", get(handlers::devices::list_devices))
        .route("/devices/{id}", get(handlers::devices::get_device))
}

/// Health check (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
