//! Event sinks for audit logging and tests.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use meethub_core::events::DomainEvent;
use meethub_core::traits::EventSink;

/// Sink that writes every event to the structured log.
///
/// Stands in for the platform's audit logger, which consumes these events
/// downstream.
#[derive(Debug, Default, Clone)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn publish(&self, event: DomainEvent) {
        match serde_json::to_string(&event.payload) {
            Ok(payload) => info!(
                target: "meethub::audit",
                event_id = %event.id,
                actor_id = ?event.actor_id,
                timestamp = %event.timestamp,
                payload = %payload,
                "domain event"
            ),
            Err(e) => warn!(
                target: "meethub::audit",
                event_id = %event.id,
                error = %e,
                "failed to serialize domain event"
            ),
        }
    }
}

/// Sink that collects events in memory, for assertions in tests.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: Mutex<Vec<DomainEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty collecting sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events published so far.
    pub async fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().await.clone()
    }

    /// Drains and returns all collected events.
    pub async fn take(&self) -> Vec<DomainEvent> {
        std::mem::take(&mut *self.events.lock().await)
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn publish(&self, event: DomainEvent) {
        self.events.lock().await.push(event);
    }
}
