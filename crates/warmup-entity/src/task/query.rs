//! Query value objects for task listings.

use serde::{Deserialize, Serialize};

use warmup_core::types::id::DeviceId;

use super::model::Task;
use super::status::TaskStatus;

/// Optional predicates for listing tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Restrict to one device.
    pub device_id: Option<DeviceId>,
    /// Restrict to one status.
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    /// Whether `task` satisfies every predicate.
    pub fn matches(&self, task: &Task) -> bool {
        self.device_id.as_ref().is_none_or(|d| *d == task.device_id)
            && self.status.is_none_or(|s| s == task.status)
    }
}

/// Task counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    /// Pending tasks.
    pub pending: u64,
    /// Running tasks.
    pub running: u64,
    /// Completed tasks.
    pub completed: u64,
    /// Permanently failed tasks.
    pub failed: u64,
}

impl TaskStats {
    /// Add `count` tasks with `status` to the tally.
    pub fn record(&mut self, status: TaskStatus, count: u64) {
        match status {
            TaskStatus::Pending => self.pending += count,
            TaskStatus::Running => self.running += count,
            TaskStatus::Completed => self.completed += count,
            TaskStatus::Failed => self.failed += count,
        }
    }

    /// Total across all statuses.
    pub fn total(&self) -> u64 {
        self.pending + self.running + self.completed + self.failed
    }
}
