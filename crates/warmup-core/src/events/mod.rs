//! Domain events emitted by lifecycle and registry operations.
//!
//! Events are handed to an [`EventPublisher`](crate::traits::EventPublisher)
//! and consumed by the realtime fan-out and anything else listening.

pub mod device;
pub mod task;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use device::DeviceEvent;
pub use task::TaskEvent;

use crate::types::id::DeviceId;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum EventPayload {
    /// A task-related event.
    Task(TaskEvent),
    /// A device-related event.
    Device(DeviceEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Shorthand for a task event.
    pub fn task(event: TaskEvent) -> Self {
        Self::new(EventPayload::Task(event))
    }

    /// Shorthand for a device event.
    pub fn device(event: DeviceEvent) -> Self {
        Self::new(EventPayload::Device(event))
    }

    /// The device this event is addressed to, if any.
    pub fn device_id(&self) -> Option<&DeviceId> {
        match &self.payload {
            EventPayload::Task(e) => Some(e.device_id()),
            EventPayload::Device(e) => e.device_id(),
        }
    }

    /// Short event name used in logs and wire messages.
    pub fn name(&self) -> &'static str {
        match &self.payload {
            EventPayload::Task(e) => e.name(),
            EventPayload::Device(e) => e.name(),
        }
    }
}
