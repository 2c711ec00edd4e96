//! Device registry events.

use serde::{Deserialize, Serialize};

use crate::types::id::DeviceId;

/// Device registry changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceEvent {
    /// A device registered (or re-registered).
    DeviceRegistered {
        /// The device.
        device_id: DeviceId,
        /// Optional label.
        name: Option<String>,
    },
    /// The offline sweep marked devices as offline.
    DevicesOffline {
        /// Devices that went offline.
        device_ids: Vec<DeviceId>,
    },
}

impl DeviceEvent {
    /// The single device addressed, if any.
    pub fn device_id(&self) -> Option<&DeviceId> {
        match self {
            Self::DeviceRegistered { device_id, .. } => Some(device_id),
            Self::DevicesOffline { .. } => None,
        }
    }

    /// Event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DeviceRegistered { .. } => "device_registered",
            Self::DevicesOffline { .. } => "devices_offline",
        }
    }
}
