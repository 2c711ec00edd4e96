//! Response DTOs.

use serde::{Deserialize, Serialize};

use warmup_core::result::AppResult;
use warmup_entity::task::Task;

use crate::error::ApiErrorResponse;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since start.
    pub uptime_seconds: u64,
    /// Active persistence backend.
    pub database: String,
    /// Whether the backend answered.
    pub database_ok: bool,
}

/// One item of a batch create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemResponse {
    /// Position in the request.
    pub index: usize,
    /// Whether the item was created.
    pub success: bool,
    /// The created task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
    /// Why the item was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorResponse>,
}

/// Batch create outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCreateResponse {
    /// Items created.
    pub created: usize,
    /// Items rejected.
    pub failed: usize,
    /// Per-item results in request order.
    pub results: Vec<BatchItemResponse>,
}

impl From<Vec<AppResult<Task>>> for BatchCreateResponse {
    fn from(results: Vec<AppResult<Task>>) -> Self {
        let results: Vec<BatchItemResponse> = results
            .into_iter()
            .enumerate()
            .map(|(index, result)| match result {
                Ok(task) => BatchItemResponse {
                    index,
                    success: true,
                    task: Some(task),
                    error: None,
                },
                Err(e) => BatchItemResponse {
                    index,
                    success: false,
                    task: None,
                    error: Some(ApiErrorResponse::from(&e)),
                },
            })
            .collect();
        let created = results.iter().filter(|r| r.success).count();
        Self {
            created,
            failed: results.len() - created,
            results,
        }
    }
}

/// Purge outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeResponse {
    /// Tasks removed.
    pub deleted: u64,
}
