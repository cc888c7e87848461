//! Reservation entity model and state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use meethub_core::types::{ActorId, ReservationId, SessionId};

/// A reservation tying one actor to one event session.
///
/// Invariant: at most one non-cancelled reservation exists per
/// (actor, session) pair. Reservations are never physically deleted;
/// cancellation is a state, not a row removal, to preserve audit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique reservation identifier.
    pub id: ReservationId,
    /// The actor holding the reservation.
    pub actor_id: ActorId,
    /// The session being reserved.
    pub session_id: SessionId,
    /// Current state.
    pub state: ReservationState,
    /// When the reservation was requested. FIFO ordering key for
    /// waitlist promotion.
    pub created_at: DateTime<Utc>,
    /// When the state last changed.
    pub transitioned_at: DateTime<Utc>,
}

impl Reservation {
    /// Creates a reservation in the given initial state.
    pub fn new(actor_id: ActorId, session_id: SessionId, state: ReservationState) -> Self {
        let now = Utc::now();
        Self {
            id: ReservationId::new(),
            actor_id,
            session_id,
            state,
            created_at: now,
            transitioned_at: now,
        }
    }

    /// Whether the reservation still occupies the (actor, session) pair.
    pub fn is_active(&self) -> bool {
        self.state != ReservationState::Cancelled
    }

    /// FIFO ordering key: request time, ties broken by reservation id so
    /// promotion order is deterministic.
    pub fn fifo_key(&self) -> (DateTime<Utc>, ReservationId) {
        (self.created_at, self.id)
    }
}

/// States of a reservation.
///
/// The transient `Requested` state of an inbound RSVP is never persisted:
/// a request resolves to `Confirmed` or `Waitlisted` within the same
/// admission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    /// Holding a seat.
    Confirmed,
    /// Queued for a seat, FIFO by request time.
    Waitlisted,
    /// Withdrawn or written off. Terminal.
    Cancelled,
}

impl ReservationState {
    /// Whether a transition from `self` to `to` is legal.
    ///
    /// `Waitlisted -> Confirmed` happens only via waitlist promotion,
    /// never via direct user action; callers enforce that distinction.
    pub fn can_transition_to(&self, to: ReservationState) -> bool {
        matches!(
            (self, to),
            (Self::Confirmed, Self::Cancelled)
                | (Self::Waitlisted, Self::Confirmed)
                | (Self::Waitlisted, Self::Cancelled)
        )
    }
}

impl std::fmt::Display for ReservationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confirmed => write!(f, "confirmed"),
            Self::Waitlisted => write!(f, "waitlisted"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}
