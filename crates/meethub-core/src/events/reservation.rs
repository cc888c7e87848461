//! Reservation-related domain events.

use serde::{Deserialize, Serialize};

use crate::types::{ActorId, ReservationId, SessionId};

/// Events related to session reservations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReservationEvent {
    /// A reservation was confirmed immediately on request.
    Confirmed {
        /// The reservation ID.
        reservation_id: ReservationId,
        /// The session ID.
        session_id: SessionId,
        /// The actor holding the reservation.
        actor_id: ActorId,
    },
    /// The session was full; the actor was placed on the waitlist.
    Waitlisted {
        /// The reservation ID.
        reservation_id: ReservationId,
        /// The session ID.
        session_id: SessionId,
        /// The actor holding the reservation.
        actor_id: ActorId,
    },
    /// A waitlisted reservation was promoted to confirmed.
    Promoted {
        /// The reservation ID.
        reservation_id: ReservationId,
        /// The session ID.
        session_id: SessionId,
        /// The actor holding the reservation.
        actor_id: ActorId,
    },
    /// A reservation was cancelled.
    Cancelled {
        /// The reservation ID.
        reservation_id: ReservationId,
        /// The session ID.
        session_id: SessionId,
        /// The actor holding the reservation.
        actor_id: ActorId,
        /// Why the reservation was cancelled.
        reason: String,
    },
}
