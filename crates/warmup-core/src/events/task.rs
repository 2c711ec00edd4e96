//! Task lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::id::{DeviceId, TaskId};

/// Task state changes fanned out to listeners of the owning device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    /// A task was queued for a device.
    TaskCreated {
        /// The task ID.
        task_id: TaskId,
        /// The owning device.
        device_id: DeviceId,
        /// Task type name.
        task_type: String,
        /// Priority name.
        priority: String,
    },
    /// A device reported success.
    TaskCompleted {
        /// The task ID.
        task_id: TaskId,
        /// The owning device.
        device_id: DeviceId,
        /// Result payload as reported.
        result: Value,
    },
    /// A task failed. `retry_at` is set when an automatic retry was scheduled.
    TaskFailed {
        /// The task ID.
        task_id: TaskId,
        /// The owning device.
        device_id: DeviceId,
        /// Failure description.
        error: String,
        /// Retry count after this failure.
        retry_count: i32,
        /// Retry cap.
        max_retries: i32,
        /// When the task becomes eligible again.
        retry_at: Option<DateTime<Utc>>,
    },
}

impl TaskEvent {
    /// The device the task belongs to.
    pub fn device_id(&self) -> &DeviceId {
        match self {
            Self::TaskCreated { device_id, .. }
            | Self::TaskCompleted { device_id, .. }
            | Self::TaskFailed { device_id, .. } => device_id,
        }
    }

    /// The task this event refers to.
    pub fn task_id(&self) -> TaskId {
        match self {
            Self::TaskCreated { task_id, .. }
            | Self::TaskCompleted { task_id, .. }
            | Self::TaskFailed { task_id, .. } => *task_id,
        }
    }

    /// Event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TaskCreated { .. } => "task_created",
            Self::TaskCompleted { .. } => "task_completed",
            Self::TaskFailed { .. } => "task_failed",
        }
    }
}
