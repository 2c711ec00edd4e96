//! Delay before an automatically retried task becomes eligible again.

use chrono::{DateTime, Duration, Utc};

use warmup_core::config::{BackoffConfig, BackoffStrategy};

/// Hard ceiling on any computed delay: one year.
const DELAY_CEILING_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Retry delay policy built from [`BackoffConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    strategy: BackoffStrategy,
    base_seconds: u64,
    max_seconds: u64,
}

impl BackoffPolicy {
    /// Same delay for every retry.
    pub fn fixed(seconds: u64) -> Self {
        Self {
            strategy: BackoffStrategy::Fixed,
            base_seconds: seconds,
            max_seconds: seconds,
        }
    }

    /// Doubling delay starting at `base_seconds`, never above `max_seconds`.
    pub fn exponential(base_seconds: u64, max_seconds: u64) -> Self {
        Self {
            strategy: BackoffStrategy::Exponential,
            base_seconds,
            max_seconds: max_seconds.max(base_seconds),
        }
    }

    /// Delay after the `retry_count`-th failure (1-based).
    pub fn delay(&self, retry_count: i32) -> Duration {
        let seconds = match self.strategy {
            BackoffStrategy::Fixed => self.base_seconds,
            BackoffStrategy::Exponential => {
                let exponent = retry_count.saturating_sub(1).clamp(0, 62) as u32;
                self.base_seconds
                    .saturating_mul(1u64 << exponent)
                    .min(self.max_seconds)
            }
        };
        Duration::seconds(seconds.min(DELAY_CEILING_SECONDS) as i64)
    }

    /// When a task failing at `now` for the `retry_count`-th time may run again.
    pub fn retry_at(&self, now: DateTime<Utc>, retry_count: i32) -> DateTime<Utc> {
        now + self.delay(retry_count)
    }
}

impl From<&BackoffConfig> for BackoffPolicy {
    fn from(config: &BackoffConfig) -> Self {
        match config.strategy {
            BackoffStrategy::Fixed => Self::fixed(config.base_delay_seconds),
            BackoffStrategy::Exponential => {
                Self::exponential(config.base_delay_seconds, config.max_delay_seconds)
            }
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from(&BackoffConfig::default())
    }
}
