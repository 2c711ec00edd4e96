//! Task lifecycle manager.
//!
//! Every status change goes through here. Each operation reads the task,
//! applies one transition from [`Task`] and writes it back with a
//! conditional update keyed on the status and revision it read. Losing
//! that race is an `InvalidState` error; the winner's write stands.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

use warmup_core::config::TaskConfig;
use warmup_core::error::AppError;
use warmup_core::events::{DomainEvent, TaskEvent};
use warmup_core::result::AppResult;
use warmup_core::traits::{DeviceRegistry, EventPublisher};
use warmup_core::types::id::{DeviceId, TaskId};
use warmup_core::types::pagination::{PageRequest, PageResponse};
use warmup_database::store::{RowVersion, TaskStore};
use warmup_entity::task::{FailOutcome, Task, TaskFilter, TaskStats, TaskStatus};

use super::input::NewTask;
use crate::backoff::BackoffPolicy;

/// The single authority over task status.
#[derive(Clone)]
pub struct TaskLifecycleManager {
    tasks: Arc<dyn TaskStore>,
    registry: Arc<dyn DeviceRegistry>,
    publisher: Arc<dyn EventPublisher>,
    config: TaskConfig,
    backoff: BackoffPolicy,
}

impl std::fmt::Debug for TaskLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskLifecycleManager")
            .field("config", &self.config)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl TaskLifecycleManager {
    /// Creates a new lifecycle manager.
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        registry: Arc<dyn DeviceRegistry>,
        publisher: Arc<dyn EventPublisher>,
        config: TaskConfig,
    ) -> Self {
        let backoff = BackoffPolicy::from(&config.backoff);
        Self {
            tasks,
            registry,
            publisher,
            config,
            backoff,
        }
    }

    /// Task limits in effect.
    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Queues a task for a registered device.
    pub async fn create(&self, input: NewTask) -> AppResult<Task> {
        let data = input.validate(&self.config)?;
        if !self.registry.device_exists(&data.device_id).await? {
            return Err(AppError::not_found(format!(
                "Device {} not found",
                data.device_id
            )));
        }

        let task = Task::new(data, Utc::now());
        self.tasks.insert(&task).await?;

        info!(
            task_id = %task.id,
            device_id = %task.device_id,
            task_type = %task.task_type,
            priority = %task.priority,
            "Task created"
        );
        if !self.registry.is_online(&task.device_id).await.unwrap_or(false) {
            debug!(device_id = %task.device_id, "Device offline; task waits for its next poll");
        }

        self.emit(TaskEvent::TaskCreated {
            task_id: task.id,
            device_id: task.device_id.clone(),
            task_type: task.task_type.as_str().to_string(),
            priority: task.priority.as_str().to_string(),
        })
        .await;
        Ok(task)
    }

    /// Creates each item independently. Results follow input order.
    pub async fn create_batch(&self, inputs: Vec<NewTask>) -> Vec<AppResult<Task>> {
        let results = join_all(inputs.into_iter().map(|input| self.create(input))).await;
        let created = results.iter().filter(|r| r.is_ok()).count();
        info!(total = results.len(), created, "Batch create finished");
        results
    }

    /// Hands up to `limit` eligible tasks to a device, marking them running.
    ///
    /// Tasks another dispatcher claimed first are skipped, as are tasks
    /// whose write fails; neither is retried within this call.
    pub async fn dispatch(&self, device_id: &str, limit: Option<u32>) -> AppResult<Vec<Task>> {
        let device_id = DeviceId::parse(device_id)?;
        if !self.registry.device_exists(&device_id).await? {
            return Err(AppError::not_found(format!("Device {device_id} not found")));
        }
        let limit = limit
            .unwrap_or(self.config.dispatch_limit_default)
            .clamp(1, self.config.dispatch_limit_max.max(1));

        let now = Utc::now();
        let candidates = self.tasks.find_dispatchable(&device_id, now, limit).await?;
        let mut dispatched = Vec::with_capacity(candidates.len());

        for mut task in candidates {
            let expected = RowVersion::of(&task);
            if let Err(e) = task.start(now) {
                debug!(task_id = %task.id, error = %e, "Skipping candidate");
                continue;
            }
            match self.tasks.update_if(&task, expected).await {
                Ok(Some(stored)) => dispatched.push(stored),
                Ok(None) => {
                    debug!(task_id = %task.id, "Task claimed by another dispatcher");
                }
                Err(e) => {
                    warn!(task_id = %task.id, error = %e, "Failed to dispatch task; skipping");
                }
            }
        }

        if !dispatched.is_empty() {
            info!(device_id = %device_id, count = dispatched.len(), "Tasks dispatched");
        }
        Ok(dispatched)
    }

    /// Records a successful run.
    pub async fn complete(&self, id: TaskId, result: serde_json::Value) -> AppResult<Task> {
        let mut task = self.load(id).await?;
        let expected = RowVersion::of(&task);
        task.complete(result, Utc::now())?;
        let task = self.write(&task, expected).await?;

        info!(task_id = %task.id, device_id = %task.device_id, "Task completed");
        self.emit(TaskEvent::TaskCompleted {
            task_id: task.id,
            device_id: task.device_id.clone(),
            result: task.result.clone().unwrap_or_default(),
        })
        .await;
        Ok(task)
    }

    /// Records a failed run, scheduling a retry while the cap allows.
    pub async fn fail(&self, id: TaskId, error: &str) -> AppResult<Task> {
        let mut task = self.load(id).await?;
        let expected = RowVersion::of(&task);
        let now = Utc::now();
        let outcome = task.fail(error, now, |count| self.backoff.retry_at(now, count))?;
        let task = self.write(&task, expected).await?;

        let retry_at = match outcome {
            FailOutcome::RetryScheduled(at) => {
                info!(
                    task_id = %task.id,
                    device_id = %task.device_id,
                    retry_count = task.retry_count,
                    max_retries = task.max_retries,
                    retry_at = %at,
                    "Task failed; retry scheduled"
                );
                Some(at)
            }
            FailOutcome::Exhausted => {
                warn!(
                    task_id = %task.id,
                    device_id = %task.device_id,
                    retry_count = task.retry_count,
                    "Task failed permanently"
                );
                None
            }
        };

        self.emit(TaskEvent::TaskFailed {
            task_id: task.id,
            device_id: task.device_id.clone(),
            error: error.to_string(),
            retry_count: task.retry_count,
            max_retries: task.max_retries,
            retry_at,
        })
        .await;
        Ok(task)
    }

    /// Operator retry: makes the task eligible now without counting a
    /// failure.
    pub async fn retry(&self, id: TaskId) -> AppResult<Task> {
        let mut task = self.load(id).await?;
        let expected = RowVersion::of(&task);
        task.retry(Utc::now())?;
        let task = self.write(&task, expected).await?;

        info!(task_id = %task.id, device_id = %task.device_id, "Task requeued by operator");
        Ok(task)
    }

    /// Deletes terminal tasks created before `older_than`. Statuses other
    /// than `completed` and `failed` are ignored.
    pub async fn purge(&self, older_than: DateTime<Utc>, statuses: &[TaskStatus]) -> AppResult<u64> {
        let statuses: Vec<TaskStatus> = TaskStatus::TERMINAL
            .into_iter()
            .filter(|s| statuses.contains(s))
            .collect();
        if statuses.is_empty() {
            return Ok(0);
        }

        let removed = self.tasks.delete_created_before(older_than, &statuses).await?;
        info!(removed, older_than = %older_than, ?statuses, "Purged tasks");
        Ok(removed)
    }

    /// Gets a task by ID.
    pub async fn get(&self, id: TaskId) -> AppResult<Task> {
        self.load(id).await
    }

    /// Lists tasks, newest first.
    pub async fn list(
        &self,
        filter: &TaskFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Task>> {
        self.tasks.list(filter, page).await
    }

    /// Task counts per status, fleet-wide or for one device.
    pub async fn stats(&self, device_id: Option<&str>) -> AppResult<TaskStats> {
        let device_id = device_id.map(DeviceId::parse).transpose()?;
        self.tasks.stats(device_id.as_ref()).await
    }

    /// Running tasks dispatched before `started_before`.
    pub async fn stale_running(
        &self,
        started_before: DateTime<Utc>,
        limit: u32,
    ) -> AppResult<Vec<Task>> {
        self.tasks.find_stale_running(started_before, limit).await
    }

    async fn load(&self, id: TaskId) -> AppResult<Task> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Task {id} not found")))
    }

    async fn write(&self, task: &Task, expected: RowVersion) -> AppResult<Task> {
        self.tasks.update_if(task, expected).await?.ok_or_else(|| {
            AppError::invalid_state(format!("Task {} was modified concurrently", task.id))
        })
    }

    async fn emit(&self, event: TaskEvent) {
        let name = event.name();
        let task_id = event.task_id();
        if let Err(e) = self.publisher.publish(DomainEvent::task(event)).await {
            warn!(event = name, task_id = %task_id, error = %e, "Failed to publish task event");
        }
    }
}
