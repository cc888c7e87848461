//! FIFO waitlist promotion.

use std::sync::Arc;

use tracing::{error, info};

use meethub_core::AppError;
use meethub_core::AppResult;
use meethub_core::events::{DomainEvent, EventPayload, ReservationEvent};
use meethub_core::traits::{CapacityTracker, EventSink, ReserveOutcome};
use meethub_core::types::SessionId;
use meethub_entity::{Reservation, ReservationState};

use crate::store::{ReservationStore, SessionStore};

/// Promotes waitlisted reservations when seats free up.
///
/// Promotion order is FIFO by request time, ties broken by reservation
/// id, so an earlier waitlisted actor can never be starved by a later
/// one. The promoter loops until no seat remains or the waitlist is
/// empty, which handles capacity increases of more than one seat.
///
/// Callers must hold the per-session admission guard while invoking
/// [`promote`](Self::promote): the promotion then happens within the same
/// critical section as the release or capacity change that triggered it,
/// so a promotion is never lost to an interleaved request.
#[derive(Clone)]
pub struct WaitlistPromoter {
    sessions: Arc<SessionStore>,
    reservations: Arc<ReservationStore>,
    tracker: Arc<dyn CapacityTracker>,
    sink: Arc<dyn EventSink>,
}

impl WaitlistPromoter {
    /// Creates a promoter over the given tables and tracker.
    pub fn new(
        sessions: Arc<SessionStore>,
        reservations: Arc<ReservationStore>,
        tracker: Arc<dyn CapacityTracker>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            sessions,
            reservations,
            tracker,
            sink,
        }
    }

    /// Promotes waitlisted reservations while seats are free.
    ///
    /// Returns the reservations promoted, in promotion order.
    pub(crate) async fn promote(&self, session_id: SessionId) -> AppResult<Vec<Reservation>> {
        let mut promoted = Vec::new();

        let session = self.sessions.require(session_id).await?;
        if !session.accepts_reservations() {
            return Ok(promoted);
        }

        loop {
            // Re-validate against the tracker rather than trusting the
            // caller's assumption that a slot is free.
            let occupancy = self.tracker.occupancy(session_id).await?;
            if !occupancy.has_free_seat() {
                break;
            }

            let Some(next) = self
                .reservations
                .waitlist_for(session_id)
                .await
                .into_iter()
                .next()
            else {
                break;
            };

            match self.tracker.try_reserve(session_id).await? {
                ReserveOutcome::Reserved => {}
                ReserveOutcome::Full => {
                    // We just observed a free seat under the session
                    // guard; a Full here means the seat accounting
                    // contradicts itself.
                    error!(
                        session_id = %session_id,
                        reservation_id = %next.id,
                        actor_id = %next.actor_id,
                        confirmed = occupancy.confirmed,
                        capacity = ?occupancy.capacity,
                        "Capacity tracker refused a seat the promoter re-validated as free"
                    );
                    return Err(AppError::internal_consistency(format!(
                        "Seat accounting mismatch while promoting reservation {} on session {}",
                        next.id, session_id
                    )));
                }
            }

            let updated = self
                .reservations
                .transition(next.id, ReservationState::Confirmed)
                .await?;

            info!(
                session_id = %session_id,
                reservation_id = %updated.id,
                actor_id = %updated.actor_id,
                "Waitlisted reservation promoted"
            );
            self.sink
                .publish(DomainEvent::new(
                    Some(updated.actor_id),
                    EventPayload::Reservation(ReservationEvent::Promoted {
                        reservation_id: updated.id,
                        session_id,
                        actor_id: updated.actor_id,
                    }),
                ))
                .await;

            promoted.push(updated);
        }

        Ok(promoted)
    }
}
