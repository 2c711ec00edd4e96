//! Sweeper (periodic reconciliation) configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the background sweeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// Whether the sweeper runs inside the server process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// A running task older than this is presumed stuck and failed.
    #[serde(default = "default_stale_task_timeout")]
    pub stale_task_timeout_minutes: i64,
    /// A device without a heartbeat for this long is marked offline.
    #[serde(default = "default_offline_after")]
    pub device_offline_after_minutes: i64,
    /// Terminal tasks older than this are purged.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    /// Cron expression (with seconds) for the stale task sweep.
    #[serde(default = "default_stale_tasks_cron")]
    pub stale_tasks_cron: String,
    /// Cron expression for the offline device sweep.
    #[serde(default = "default_offline_devices_cron")]
    pub offline_devices_cron: String,
    /// Cron expression for the retention purge.
    #[serde(default = "default_retention_cron")]
    pub retention_cron: String,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            stale_task_timeout_minutes: default_stale_task_timeout(),
            device_offline_after_minutes: default_offline_after(),
            retention_days: default_retention_days(),
            stale_tasks_cron: default_stale_tasks_cron(),
            offline_devices_cron: default_offline_devices_cron(),
            retention_cron: default_retention_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_stale_task_timeout() -> i64 {
    30
}

fn default_offline_after() -> i64 {
    5
}

fn default_retention_days() -> i64 {
    30
}

fn default_stale_tasks_cron() -> String {
    "0 */5 * * * *".to_string()
}

fn default_offline_devices_cron() -> String {
    "0 * * * * *".to_string()
}

fn default_retention_cron() -> String {
    "0 0 3 * * *".to_string()
}
