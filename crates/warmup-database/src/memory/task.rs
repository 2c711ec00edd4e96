//! In-memory task store.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use warmup_core::error::AppError;
use warmup_core::result::AppResult;
use warmup_core::types::id::{DeviceId, TaskId};
use warmup_core::types::pagination::{PageRequest, PageResponse};
use warmup_entity::task::{Task, TaskFilter, TaskStats, TaskStatus};

use super::paginate;
use crate::store::{RowVersion, TaskStore};

#[derive(Debug)]
struct Slot {
    task: Task,
    /// Insertion order, the last tie-breaker for dispatch.
    seq: u64,
}

/// Tasks held in a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: DashMap<TaskId, Slot>,
    next_seq: AtomicU64,
}

impl MemoryTaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the store holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn collect_where(&self, keep: impl Fn(&Task) -> bool) -> Vec<(Task, u64)> {
        self.tasks
            .iter()
            .filter(|slot| keep(&slot.task))
            .map(|slot| (slot.task.clone(), slot.seq))
            .collect()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, task: &Task) -> AppResult<()> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        match self.tasks.entry(task.id) {
            Entry::Occupied(_) => Err(AppError::internal(format!(
                "Task {} already exists",
                task.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(Slot {
                    task: task.clone(),
                    seq,
                });
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: TaskId) -> AppResult<Option<Task>> {
        Ok(self.tasks.get(&id).map(|slot| slot.task.clone()))
    }

    async fn find_dispatchable(
        &self,
        device_id: &DeviceId,
        now: DateTime<Utc>,
        limit: u32,
    ) -> AppResult<Vec<Task>> {
        let mut ready = self.collect_where(|t| t.device_id == *device_id && t.is_dispatchable(now));
        ready.sort_by_key(|(t, seq)| (t.priority.dispatch_rank(), t.created_at, *seq));
        Ok(ready
            .into_iter()
            .take(limit as usize)
            .map(|(t, _)| t)
            .collect())
    }

    async fn update_if(&self, task: &Task, expected: RowVersion) -> AppResult<Option<Task>> {
        let Some(mut slot) = self.tasks.get_mut(&task.id) else {
            return Ok(None);
        };
        if RowVersion::of(&slot.task) != expected {
            return Ok(None);
        }
        let mut updated = task.clone();
        updated.revision = slot.task.revision + 1;
        slot.task = updated.clone();
        Ok(Some(updated))
    }

    async fn list(
        &self,
        filter: &TaskFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Task>> {
        let mut matching = self.collect_where(|t| filter.matches(t));
        matching.sort_by(|(a, sa), (b, sb)| b.created_at.cmp(&a.created_at).then(sb.cmp(sa)));
        Ok(paginate(
            matching.into_iter().map(|(t, _)| t).collect(),
            page,
        ))
    }

    async fn stats(&self, device_id: Option<&DeviceId>) -> AppResult<TaskStats> {
        let mut stats = TaskStats::default();
        for slot in self.tasks.iter() {
            if device_id.is_none_or(|d| *d == slot.task.device_id) {
                stats.record(slot.task.status, 1);
            }
        }
        Ok(stats)
    }

    async fn find_stale_running(
        &self,
        started_before: DateTime<Utc>,
        limit: u32,
    ) -> AppResult<Vec<Task>> {
        let mut stale = self.collect_where(|t| {
            t.status == TaskStatus::Running && t.started_at.is_some_and(|s| s < started_before)
        });
        stale.sort_by_key(|(t, seq)| (t.started_at, *seq));
        Ok(stale
            .into_iter()
            .take(limit as usize)
            .map(|(t, _)| t)
            .collect())
    }

    async fn delete_created_before(
        &self,
        created_before: DateTime<Utc>,
        statuses: &[TaskStatus],
    ) -> AppResult<u64> {
        let before = self.tasks.len();
        self.tasks.retain(|_, slot| {
            !(slot.task.created_at < created_before && statuses.contains(&slot.task.status))
        });
        Ok(before.saturating_sub(self.tasks.len()) as u64)
    }
}
