//! Unvalidated task creation input.

use serde::{Deserialize, Serialize};

use warmup_core::config::TaskConfig;
use warmup_core::error::AppError;
use warmup_core::result::AppResult;
use warmup_core::types::id::DeviceId;
use warmup_entity::task::{CreateTask, TaskPriority, TaskType};

/// A create request as it arrives from the API or CLI.
///
/// Enumerated fields stay as strings so that each item of a batch can be
/// rejected on its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    /// Owning device.
    pub device_id: String,
    /// Task type name, e.g. `send_message`.
    pub task_type: String,
    /// Payload for the device. Defaults to `{}`.
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
    /// Priority name. Defaults to `normal`.
    #[serde(default)]
    pub priority: Option<String>,
    /// Retry cap. Defaults to `tasks.default_max_retries`.
    #[serde(default)]
    pub max_retries: Option<i32>,
}

impl NewTask {
    /// Shorthand for a normal-priority task with default retries.
    pub fn new(device_id: impl Into<String>, task_type: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            task_type: task_type.into(),
            ..Self::default()
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Set the retry cap.
    pub fn with_max_retries(mut self, max_retries: i32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Set the payload.
    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Parse and bound-check every field.
    pub fn validate(self, config: &TaskConfig) -> AppResult<CreateTask> {
        let device_id = DeviceId::parse(self.device_id)?;
        let task_type: TaskType = self.task_type.parse()?;
        let priority = match self.priority.as_deref() {
            Some(raw) => raw.parse()?,
            None => TaskPriority::default(),
        };
        let max_retries = self.max_retries.unwrap_or(config.default_max_retries);
        if !(0..=config.max_retries_limit).contains(&max_retries) {
            return Err(AppError::invalid_argument(format!(
                "max_retries must be between 0 and {}, got {max_retries}",
                config.max_retries_limit
            )));
        }

        Ok(CreateTask {
            device_id,
            task_type,
            parameters: self
                .parameters
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            priority,
            max_retries,
        })
    }
}
