//! Retention purge of finished tasks.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;

use warmup_core::result::AppResult;
use warmup_entity::task::TaskStatus;
use warmup_service::TaskLifecycleManager;

use crate::sweep::SweepJob;

/// Deletes completed and failed tasks older than the retention window.
#[derive(Debug)]
pub struct TaskRetentionSweep {
    tasks: Arc<TaskLifecycleManager>,
    retention_days: i64,
    schedule: String,
}

impl TaskRetentionSweep {
    /// Create the sweep.
    pub fn new(tasks: Arc<TaskLifecycleManager>, retention_days: i64, schedule: String) -> Self {
        Self {
            tasks,
            retention_days,
            schedule,
        }
    }
}

#[async_trait]
impl SweepJob for TaskRetentionSweep {
    fn name(&self) -> &str {
        "task_retention"
    }

    fn schedule(&self) -> &str {
        &self.schedule
    }

    async fn run(&self) -> AppResult<Value> {
        let cutoff = Utc::now() - Duration::days(self.retention_days);
        let deleted = self.tasks.purge(cutoff, &TaskStatus::TERMINAL).await?;

        Ok(serde_json::json!({
            "sweep": "task_retention",
            "deleted": deleted,
            "retention_days": self.retention_days,
        }))
    }
}
