//! Domain events emitted by admission decisions.
//!
//! Events are handed to the configured [`EventSink`](crate::traits::EventSink)
//! and consumed by external collaborators: the audit logger and the
//! notification system.

pub mod connection;
pub mod quota;
pub mod reservation;
pub mod session;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ActorId;

pub use connection::ConnectionEvent;
pub use quota::QuotaEvent;
pub use reservation::ReservationEvent;
pub use session::SessionEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The actor who caused the event (if applicable).
    pub actor_id: Option<ActorId>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A reservation-related event.
    Reservation(ReservationEvent),
    /// A connection-related event.
    Connection(ConnectionEvent),
    /// A quota-related event.
    Quota(QuotaEvent),
    /// An event-session lifecycle event.
    Session(SessionEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<ActorId>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }
}
