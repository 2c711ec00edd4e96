//! Task entity model and its state transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warmup_core::error::AppError;
use warmup_core::result::AppResult;
use warmup_core::types::id::{DeviceId, TaskId};

use super::kind::TaskType;
use super::status::{TaskPriority, TaskStatus};

/// A unit of work assigned to exactly one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Owning device. Never reassigned.
    pub device_id: DeviceId,
    /// Kind of work.
    pub task_type: TaskType,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// Dispatch priority.
    pub priority: TaskPriority,
    /// Opaque payload interpreted by the device.
    pub parameters: serde_json::Value,
    /// Opaque payload reported on completion.
    pub result: Option<serde_json::Value>,
    /// Last failure description.
    pub error_message: Option<String>,
    /// Failures so far.
    pub retry_count: i32,
    /// Failure cap.
    pub max_retries: i32,
    /// Not dispatched before this instant.
    pub scheduled_at: DateTime<Utc>,
    /// When the current attempt was dispatched.
    pub started_at: Option<DateTime<Utc>>,
    /// When the task completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the row last changed.
    pub updated_at: DateTime<Utc>,
    /// Incremented by the store on every conditional write.
    pub revision: i64,
}

/// Data required to create a new task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owning device.
    pub device_id: DeviceId,
    /// Kind of work.
    pub task_type: TaskType,
    /// Opaque payload.
    pub parameters: serde_json::Value,
    /// Dispatch priority.
    pub priority: TaskPriority,
    /// Failure cap.
    pub max_retries: i32,
}

/// What a failure did to the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOutcome {
    /// Back to pending, eligible again at the given instant.
    RetryScheduled(DateTime<Utc>),
    /// Retry cap reached; the task is permanently failed.
    Exhausted,
}

impl Task {
    /// Build a pending task, immediately eligible for dispatch.
    pub fn new(data: CreateTask, now: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            device_id: data.device_id,
            task_type: data.task_type,
            status: TaskStatus::Pending,
            priority: data.priority,
            parameters: data.parameters,
            result: None,
            error_message: None,
            retry_count: 0,
            max_retries: data.max_retries,
            scheduled_at: now,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }

    /// Whether a poll at `now` may hand this task out.
    pub fn is_dispatchable(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Pending && self.scheduled_at <= now
    }

    /// Whether a retry is still allowed under the cap.
    pub fn has_retries_left(&self) -> bool {
        self.retry_count < self.max_retries
    }

    /// `pending -> running`.
    pub fn start(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        self.expect_status(&[TaskStatus::Pending], "start")?;
        self.status = TaskStatus::Running;
        self.started_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// `running -> completed`, storing `result` verbatim.
    pub fn complete(&mut self, result: serde_json::Value, now: DateTime<Utc>) -> AppResult<()> {
        self.expect_status(&[TaskStatus::Running], "complete")?;
        self.status = TaskStatus::Completed;
        self.result = Some(result);
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Record a failure from `pending` or `running`.
    ///
    /// With retries left the task returns to `pending`, eligible at
    /// `retry_at(retry_count)`. Otherwise it becomes `failed` for good.
    /// `retry_count` never passes `max_retries`, so with a cap of zero the
    /// first failure is final and the count stays at zero.
    pub fn fail(
        &mut self,
        error: impl Into<String>,
        now: DateTime<Utc>,
        retry_at: impl FnOnce(i32) -> DateTime<Utc>,
    ) -> AppResult<FailOutcome> {
        self.expect_status(&[TaskStatus::Pending, TaskStatus::Running], "fail")?;
        if self.has_retries_left() {
            self.retry_count += 1;
        }
        self.error_message = Some(error.into());
        self.updated_at = now;

        if self.has_retries_left() {
            let at = retry_at(self.retry_count);
            self.reset(at);
            Ok(FailOutcome::RetryScheduled(at))
        } else {
            self.status = TaskStatus::Failed;
            Ok(FailOutcome::Exhausted)
        }
    }

    /// Operator retry: back to `pending`, eligible at `now`, without
    /// counting another failure. A running task must report through
    /// `fail` first.
    pub fn retry(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if matches!(self.status, TaskStatus::Completed | TaskStatus::Running) {
            return Err(AppError::invalid_state(format!(
                "Task {} is {} and cannot be retried",
                self.id, self.status
            )));
        }
        if !self.has_retries_left() {
            return Err(AppError::retries_exhausted(format!(
                "Task {} has used {}/{} retries",
                self.id, self.retry_count, self.max_retries
            )));
        }
        self.error_message = None;
        self.updated_at = now;
        self.reset(now);
        Ok(())
    }

    fn reset(&mut self, eligible_at: DateTime<Utc>) {
        self.status = TaskStatus::Pending;
        self.scheduled_at = eligible_at;
        self.started_at = None;
        self.completed_at = None;
    }

    fn expect_status(&self, allowed: &[TaskStatus], action: &str) -> AppResult<()> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(AppError::invalid_state(format!(
                "Cannot {action} task {} while it is {}",
                self.id, self.status
            )))
        }
    }
}
