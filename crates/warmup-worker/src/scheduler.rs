//! Cron scheduler running the registered sweeps.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use warmup_core::error::AppError;

use crate::sweep::{SweepJob, SweepRegistry};

/// Cron-based scheduler for the sweeps.
pub struct CronScheduler {
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create an empty scheduler.
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;
        Ok(Self { scheduler })
    }

    /// Schedule every sweep in the registry on its own cron expression.
    pub async fn register_all(&self, registry: &SweepRegistry) -> Result<(), AppError> {
        for job in registry.jobs() {
            self.register(Arc::clone(job)).await?;
        }
        tracing::info!(sweeps = ?registry.names(), "All sweeps scheduled");
        Ok(())
    }

    /// Schedule one sweep. Its summary is logged after every run; a failed
    /// run is logged and retried on the next tick.
    pub async fn register(&self, sweep: Arc<dyn SweepJob>) -> Result<(), AppError> {
        let name = sweep.name().to_string();
        let schedule = sweep.schedule().to_string();

        let job = CronJob::new_async(schedule.as_str(), move |_uuid, _lock| {
            let sweep = Arc::clone(&sweep);
            Box::pin(async move {
                match sweep.run().await {
                    Ok(summary) => {
                        tracing::debug!(sweep = sweep.name(), %summary, "Sweep finished");
                    }
                    Err(e) => {
                        tracing::error!(sweep = sweep.name(), error = %e, "Sweep failed");
                    }
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid schedule '{schedule}' for {name}: {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {name} schedule: {e}")))?;

        tracing::info!("Registered: {name} ({schedule})");
        Ok(())
    }

    /// Start ticking.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;
        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Stop ticking.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        let mut scheduler = self.scheduler.clone();
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shut down scheduler: {e}")))?;
        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use warmup_core::config::SweeperConfig;
    use warmup_core::error::ErrorKind;
    use warmup_core::result::AppResult;

    use crate::jobs::fixture::fixture;

    #[derive(Debug)]
    struct BadSchedule;

    #[async_trait]
    impl SweepJob for BadSchedule {
        fn name(&self) -> &str {
            "bad"
        }

        fn schedule(&self) -> &str {
            "every now and then"
        }

        async fn run(&self) -> AppResult<Value> {
            Ok(Value::Null)
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn default_sweeps_register() {
        let f = fixture().await;
        let registry =
            SweepRegistry::with_defaults(&SweeperConfig::default(), f.tasks, f.devices);
        assert_eq!(
            registry.names(),
            vec!["offline_devices", "stale_tasks", "task_retention"]
        );

        let scheduler = CronScheduler::new().await.expect("scheduler");
        scheduler.register_all(&registry).await.expect("register");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn invalid_cron_is_a_configuration_error() {
        let scheduler = CronScheduler::new().await.expect("scheduler");
        let err = scheduler
            .register(Arc::new(BadSchedule))
            .await
            .expect_err("bad cron");
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn registry_runs_sweeps_by_name() {
        let f = fixture().await;
        let registry =
            SweepRegistry::with_defaults(&SweeperConfig::default(), f.tasks, f.devices);
        let summary = registry.run("task_retention").await.expect("run");
        assert_eq!(summary["deleted"], 0);

        let err = registry.run("vacuum").await.expect_err("unknown");
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }
}
