//! Channel names.

use std::fmt;

use warmup_core::types::id::DeviceId;

/// A channel listeners can subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Events addressed to one device: `device:{id}`.
    Device(DeviceId),
    /// Every task and device event: `tasks`.
    Tasks,
}

impl Channel {
    /// Parses a channel name. Returns `None` for anything unrecognised.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.split_once(':') {
            Some(("device", id)) => DeviceId::parse(id).ok().map(Self::Device),
            None if raw == "tasks" => Some(Self::Tasks),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(id) => write!(f, "device:{id}"),
            Self::Tasks => f.write_str("tasks"),
        }
    }
}
