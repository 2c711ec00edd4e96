//! Device entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warmup_core::types::id::DeviceId;

/// A phone known to the fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Device {
    /// Stable external identifier.
    pub device_id: DeviceId,
    /// Optional operator-facing label.
    pub name: Option<String>,
    /// Whether the device is currently considered online.
    pub is_online: bool,
    /// Last registration or heartbeat.
    pub last_seen: DateTime<Utc>,
    /// First registration.
    pub created_at: DateTime<Utc>,
    /// Last row update.
    pub updated_at: DateTime<Utc>,
}

impl Device {
    /// A freshly registered, online device.
    pub fn register(device_id: DeviceId, name: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            device_id,
            name,
            is_online: true,
            last_seen: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the device has gone quiet since `cutoff`.
    pub fn is_stale(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_seen < cutoff
    }
}
