//! Event sink trait for audit and notification collaborators.

use async_trait::async_trait;

use crate::events::DomainEvent;

/// Receives domain events emitted by admission decisions.
///
/// Sinks must not fail the emitting operation: delivery problems are the
/// sink's to log and absorb. Admission decisions are already committed by
/// the time an event is published.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publishes a single domain event.
    async fn publish(&self, event: DomainEvent);
}
