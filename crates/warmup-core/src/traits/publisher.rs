//! Event fan-out trait.

use async_trait::async_trait;

use crate::events::DomainEvent;
use crate::result::AppResult;

/// Fire-and-forget delivery of domain events.
///
/// Callers log a returned error and carry on; a failed publish never
/// undoes the state change that produced the event.
#[async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    /// Publish an event to interested listeners.
    async fn publish(&self, event: DomainEvent) -> AppResult<()>;
}

/// Publisher that drops every event. Used by one-shot CLI commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, event: DomainEvent) -> AppResult<()> {
        tracing::trace!(event = event.name(), "Dropping event (no publisher)");
        Ok(())
    }
}
