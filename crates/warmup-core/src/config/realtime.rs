//! Event fan-out configuration.

use serde::{Deserialize, Serialize};

/// Settings for the in-process event broadcaster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-channel broadcast buffer. Slow subscribers lag past this.
    #[serde(default = "default_buffer_size")]
    pub channel_buffer_size: usize,
    /// Interval between WebSocket pings in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_buffer_size(),
            ping_interval_seconds: default_ping_interval(),
        }
    }
}

fn default_buffer_size() -> usize {
    256
}

fn default_ping_interval() -> u64 {
    30
}
