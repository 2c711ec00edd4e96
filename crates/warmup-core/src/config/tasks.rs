//! Task lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Limits and retry policy for the task lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// `max_retries` applied when a create request omits it.
    #[serde(default = "default_max_retries")]
    pub default_max_retries: i32,
    /// Upper bound accepted for `max_retries` on create.
    #[serde(default = "default_max_retries_limit")]
    pub max_retries_limit: i32,
    /// Dispatch batch size when a poll omits `limit`.
    #[serde(default = "default_dispatch_limit")]
    pub dispatch_limit_default: u32,
    /// Largest dispatch batch a single poll may request.
    #[serde(default = "default_dispatch_limit_max")]
    pub dispatch_limit_max: u32,
    /// Delay before an automatically retried task is eligible again.
    #[serde(default)]
    pub backoff: BackoffConfig,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            default_max_retries: default_max_retries(),
            max_retries_limit: default_max_retries_limit(),
            dispatch_limit_default: default_dispatch_limit(),
            dispatch_limit_max: default_dispatch_limit_max(),
            backoff: BackoffConfig::default(),
        }
    }
}

/// How the retry delay grows with the retry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Same delay for every retry.
    #[default]
    Fixed,
    /// `base * 2^(retry_count - 1)`, capped at `max_delay_seconds`.
    Exponential,
}

/// Retry backoff configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Growth strategy.
    #[serde(default)]
    pub strategy: BackoffStrategy,
    /// Base delay in seconds.
    #[serde(default = "default_base_delay")]
    pub base_delay_seconds: u64,
    /// Ceiling for exponential growth in seconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_seconds: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            strategy: BackoffStrategy::default(),
            base_delay_seconds: default_base_delay(),
            max_delay_seconds: default_max_delay(),
        }
    }
}

fn default_max_retries() -> i32 {
    3
}

fn default_max_retries_limit() -> i32 {
    10
}

fn default_dispatch_limit() -> u32 {
    10
}

fn default_dispatch_limit_max() -> u32 {
    50
}

fn default_base_delay() -> u64 {
    300
}

fn default_max_delay() -> u64 {
    3600
}
