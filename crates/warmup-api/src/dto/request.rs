//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use warmup_service::NewTask;

/// `POST /api/android/register`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterDeviceRequest {
    /// Device identifier.
    #[validate(length(min = 1, max = 128, message = "device_id must be 1-128 characters"))]
    pub device_id: String,
    /// Optional label.
    #[validate(length(max = 255))]
    pub name: Option<String>,
}

/// `POST /api/android/heartbeat`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HeartbeatRequest {
    /// Device identifier.
    #[validate(length(min = 1, max = 128, message = "device_id must be 1-128 characters"))]
    pub device_id: String,
}

/// `GET /api/android/task/poll`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PollQuery {
    /// Polling device.
    #[validate(length(min = 1, max = 128, message = "device_id must be 1-128 characters"))]
    pub device_id: String,
    /// Batch size; clamped server-side.
    pub limit: Option<u32>,
}

/// `POST /api/android/task/{id}/complete`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteTaskRequest {
    /// Result payload, stored verbatim.
    #[serde(default)]
    pub result: serde_json::Value,
}

/// `POST /api/android/task/{id}/fail`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FailTaskRequest {
    /// Failure description.
    #[serde(alias = "error_message")]
    #[validate(length(min = 1, max = 4000, message = "error must be 1-4000 characters"))]
    pub error: String,
}

/// `POST /api/tasks`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Owning device.
    #[validate(length(min = 1, max = 128))]
    pub device_id: String,
    /// Task type name.
    #[serde(alias = "type")]
    #[validate(length(min = 1, max = 64))]
    pub task_type: String,
    /// Payload for the device.
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
    /// `low`, `normal`, `high` or `urgent`.
    #[serde(default)]
    pub priority: Option<String>,
    /// Retry cap.
    #[serde(default)]
    pub max_retries: Option<i32>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(req: CreateTaskRequest) -> Self {
        Self {
            device_id: req.device_id,
            task_type: req.task_type,
            parameters: req.parameters,
            priority: req.priority,
            max_retries: req.max_retries,
        }
    }
}

/// `POST /api/tasks/batch`
///
/// Items are validated one by one by the lifecycle manager so that a bad
/// item is reported without rejecting the batch.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BatchCreateRequest {
    /// Tasks to create.
    #[validate(length(min = 1, max = 500, message = "batch must hold 1-500 tasks"))]
    pub tasks: Vec<CreateTaskRequest>,
}

/// `GET /api/tasks`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTasksQuery {
    /// Restrict to one device.
    pub device_id: Option<String>,
    /// Restrict to one status.
    pub status: Option<String>,
    /// Page number.
    pub page: Option<u64>,
    /// Page size.
    pub page_size: Option<u64>,
}

/// `GET /api/tasks/stats`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsQuery {
    /// Restrict to one device.
    pub device_id: Option<String>,
}

/// `POST /api/tasks/purge`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PurgeRequest {
    /// Remove tasks created more than this many days ago.
    #[validate(range(min = 0, max = 3650))]
    pub older_than_days: i64,
    /// Statuses to remove; only `completed` and `failed` are honoured.
    /// Absent or empty means both.
    #[serde(default)]
    pub statuses: Option<Vec<String>>,
}
