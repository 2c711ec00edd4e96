//! Stale task sweep: fails running tasks whose device never reported back.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;

use warmup_core::result::AppResult;
use warmup_service::TaskLifecycleManager;

use crate::sweep::SweepJob;

/// Upper bound on tasks failed per run; the next run picks up the rest.
const BATCH_LIMIT: u32 = 500;

/// Fails running tasks dispatched longer ago than the timeout.
#[derive(Debug)]
pub struct StaleTasksSweep {
    tasks: Arc<TaskLifecycleManager>,
    timeout_minutes: i64,
    schedule: String,
}

impl StaleTasksSweep {
    /// Create the sweep.
    pub fn new(tasks: Arc<TaskLifecycleManager>, timeout_minutes: i64, schedule: String) -> Self {
        Self {
            tasks,
            timeout_minutes,
            schedule,
        }
    }
}

#[async_trait]
impl SweepJob for StaleTasksSweep {
    fn name(&self) -> &str {
        "stale_tasks"
    }

    fn schedule(&self) -> &str {
        &self.schedule
    }

    async fn run(&self) -> AppResult<Value> {
        tracing::debug!("Running stale task sweep");

        let cutoff = Utc::now() - Duration::minutes(self.timeout_minutes);
        let stale = self.tasks.stale_running(cutoff, BATCH_LIMIT).await?;
        let reason = format!(
            "task timed out after {} minutes without a result",
            self.timeout_minutes
        );

        let mut failed = 0;
        for task in &stale {
            if let Err(e) = self.tasks.fail(task.id, &reason).await {
                tracing::warn!(task_id = %task.id, error = %e, "Failed to time out stale task");
                continue;
            }
            failed += 1;
        }

        if failed > 0 {
            tracing::info!(failed, timeout_minutes = self.timeout_minutes, "Timed out stale tasks");
        }

        Ok(serde_json::json!({
            "sweep": "stale_tasks",
            "stale_found": stale.len(),
            "failed": failed,
            "timeout_minutes": self.timeout_minutes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warmup_database::store::TaskStore;
    use warmup_entity::task::{Task, TaskStatus};
    use warmup_service::NewTask;

    use crate::jobs::fixture::fixture;

    #[tokio::test]
    async fn fails_only_tasks_past_the_timeout() {
        let f = fixture().await;
        let data = NewTask::new("phone-1", "send_message")
            .validate(f.tasks.config())
            .expect("valid");

        let mut stuck = Task::new(data.clone(), Utc::now() - Duration::hours(2));
        stuck.status = TaskStatus::Running;
        stuck.started_at = Some(Utc::now() - Duration::hours(1));
        let mut fresh = Task::new(data, Utc::now());
        fresh.status = TaskStatus::Running;
        fresh.started_at = Some(Utc::now());
        f.store.insert(&stuck).await.expect("insert");
        f.store.insert(&fresh).await.expect("insert");

        let sweep = StaleTasksSweep::new(f.tasks.clone(), 30, "0 */5 * * * *".into());
        let summary = sweep.run().await.expect("sweep");
        assert_eq!(summary["stale_found"], 1);
        assert_eq!(summary["failed"], 1);

        let stuck = f.tasks.get(stuck.id).await.expect("get");
        assert_eq!(stuck.status, TaskStatus::Pending);
        assert_eq!(stuck.retry_count, 1);
        assert!(stuck.started_at.is_none());
        assert_eq!(
            f.tasks.get(fresh.id).await.expect("get").status,
            TaskStatus::Running
        );
    }
}
