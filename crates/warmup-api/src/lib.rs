//! # warmup-api
//!
//! HTTP API layer for the warmup backend built on Axum.
//!
//! Device-facing routes live under `/api/android`, operator routes under
//! `/api/tasks` and `/api/devices`. Task and device events stream over
//! `/ws/{channel}`.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
