//! Storage traits for tasks and devices.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use warmup_core::result::AppResult;
use warmup_core::types::id::{DeviceId, TaskId};
use warmup_core::types::pagination::{PageRequest, PageResponse};
use warmup_entity::device::Device;
use warmup_entity::task::{Task, TaskFilter, TaskStats, TaskStatus};

/// The state a conditional write expects to find.
///
/// Taken from a task as it was read; the write only lands if the stored
/// row still has the same status and revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowVersion {
    /// Status at read time.
    pub status: TaskStatus,
    /// Revision at read time.
    pub revision: i64,
}

impl RowVersion {
    /// Capture the version of `task` before mutating it.
    pub fn of(task: &Task) -> Self {
        Self {
            status: task.status,
            revision: task.revision,
        }
    }
}

/// Durable task rows.
#[async_trait]
pub trait TaskStore: Send + Sync + 'static {
    /// Insert a new task.
    async fn insert(&self, task: &Task) -> AppResult<()>;

    /// Find a task by ID.
    async fn find_by_id(&self, id: TaskId) -> AppResult<Option<Task>>;

    /// Pending tasks of `device_id` with `scheduled_at <= now`, most urgent
    /// first, oldest first within a priority. At most `limit` rows.
    async fn find_dispatchable(
        &self,
        device_id: &DeviceId,
        now: DateTime<Utc>,
        limit: u32,
    ) -> AppResult<Vec<Task>>;

    /// Replace the stored row with `task` if it still matches `expected`,
    /// bumping the revision. Returns the stored row, or `None` when another
    /// writer got there first.
    async fn update_if(&self, task: &Task, expected: RowVersion) -> AppResult<Option<Task>>;

    /// Page through tasks matching `filter`, newest first.
    async fn list(&self, filter: &TaskFilter, page: &PageRequest)
    -> AppResult<PageResponse<Task>>;

    /// Count tasks per status, optionally for one device.
    async fn stats(&self, device_id: Option<&DeviceId>) -> AppResult<TaskStats>;

    /// Running tasks dispatched before `started_before`, oldest first.
    async fn find_stale_running(
        &self,
        started_before: DateTime<Utc>,
        limit: u32,
    ) -> AppResult<Vec<Task>>;

    /// Delete tasks created before `created_before` whose status is in
    /// `statuses`. Returns the number removed.
    async fn delete_created_before(
        &self,
        created_before: DateTime<Utc>,
        statuses: &[TaskStatus],
    ) -> AppResult<u64>;
}

/// Durable device rows.
#[async_trait]
pub trait DeviceStore: Send + Sync + 'static {
    /// Insert or refresh a device, marking it online. A `None` name keeps
    /// the stored one.
    async fn upsert(
        &self,
        device_id: &DeviceId,
        name: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<Device>;

    /// Record a heartbeat. Returns `None` for unknown devices.
    async fn touch(&self, device_id: &DeviceId, now: DateTime<Utc>) -> AppResult<Option<Device>>;

    /// Find a device by ID.
    async fn find_by_id(&self, device_id: &DeviceId) -> AppResult<Option<Device>>;

    /// Page through devices ordered by ID.
    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<Device>>;

    /// Mark online devices last seen before `cutoff` as offline and return
    /// their IDs.
    async fn mark_offline_before(
        &self,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<DeviceId>>;
}
