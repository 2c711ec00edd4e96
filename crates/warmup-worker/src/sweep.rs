//! Sweep trait and registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use warmup_core::config::SweeperConfig;
use warmup_core::error::AppError;
use warmup_core::result::AppResult;
use warmup_service::{DeviceService, TaskLifecycleManager};

use crate::jobs::{OfflineDevicesSweep, StaleTasksSweep, TaskRetentionSweep};

/// A periodic reconciliation job.
#[async_trait]
pub trait SweepJob: Send + Sync + std::fmt::Debug {
    /// Stable name used for logging and by `sweep run <name>`.
    fn name(&self) -> &str;

    /// Cron expression (with seconds) the scheduler uses.
    fn schedule(&self) -> &str;

    /// Run once and return a JSON summary.
    async fn run(&self) -> AppResult<Value>;
}

/// Sweeps by name.
#[derive(Debug, Default, Clone)]
pub struct SweepRegistry {
    jobs: BTreeMap<String, Arc<dyn SweepJob>>,
}

impl SweepRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The three built-in sweeps, configured from `config`.
    pub fn with_defaults(
        config: &SweeperConfig,
        tasks: Arc<TaskLifecycleManager>,
        devices: Arc<DeviceService>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(StaleTasksSweep::new(
            Arc::clone(&tasks),
            config.stale_task_timeout_minutes,
            config.stale_tasks_cron.clone(),
        )));
        registry.register(Arc::new(OfflineDevicesSweep::new(
            devices,
            config.device_offline_after_minutes,
            config.offline_devices_cron.clone(),
        )));
        registry.register(Arc::new(TaskRetentionSweep::new(
            tasks,
            config.retention_days,
            config.retention_cron.clone(),
        )));
        registry
    }

    /// Add or replace a sweep.
    pub fn register(&mut self, job: Arc<dyn SweepJob>) {
        tracing::debug!(sweep = job.name(), "Registered sweep");
        self.jobs.insert(job.name().to_string(), job);
    }

    /// Registered sweep names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.jobs.keys().map(String::as_str).collect()
    }

    /// All registered sweeps.
    pub fn jobs(&self) -> impl Iterator<Item = &Arc<dyn SweepJob>> {
        self.jobs.values()
    }

    /// Run one sweep by name.
    pub async fn run(&self, name: &str) -> AppResult<Value> {
        let job = self.jobs.get(name).ok_or_else(|| {
            AppError::invalid_argument(format!(
                "Unknown sweep '{name}'; expected one of: {}",
                self.names().join(", ")
            ))
        })?;
        let summary = job.run().await?;
        tracing::info!(sweep = name, %summary, "Sweep finished");
        Ok(summary)
    }
}
