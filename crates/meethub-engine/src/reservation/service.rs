//! Reservation admission service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use meethub_core::AppError;
use meethub_core::AppResult;
use meethub_core::events::{DomainEvent, EventPayload, ReservationEvent, SessionEvent};
use meethub_core::traits::{CapacityTracker, EventSink, ReserveOutcome};
use meethub_core::types::{ActorId, ReservationId, SeatCapacity, SessionId};
use meethub_entity::{EventSession, Reservation, ReservationState, SessionStatus};

use crate::reservation::promoter::WaitlistPromoter;
use crate::store::Stores;

/// Result of a reservation request or cancellation.
///
/// Waitlisting is a success outcome ("you're on the waitlist"), never an
/// error; callers branch on `state`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReservationOutcome {
    /// The reservation the decision applies to.
    pub reservation_id: ReservationId,
    /// The resulting state.
    pub state: ReservationState,
}

/// Staff-requested changes to a session. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionUpdate {
    /// New title.
    pub title: Option<String>,
    /// New capacity; `0` means unlimited.
    pub capacity: Option<u32>,
    /// New start time.
    pub starts_at: Option<DateTime<Utc>>,
    /// New end time.
    pub ends_at: Option<DateTime<Utc>>,
    /// New location.
    pub location: Option<String>,
}

/// Result of a staff deletion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteOutcome {
    /// The session had no active reservations and was removed.
    Deleted,
    /// The session had active reservations and was soft-cancelled,
    /// leaving reservation history intact.
    SoftCancelled,
}

/// Orchestrates reservation admission for event sessions.
///
/// One admission guard exists per session; every mutating operation for a
/// session (request, cancel, promote, staff update, delete) runs under
/// that guard. The guard is the engine's transaction boundary: the
/// duplicate check, the seat reservation, the row write, and any
/// triggered promotions commit together or not at all.
#[derive(Clone)]
pub struct ReservationService {
    stores: Stores,
    tracker: Arc<dyn CapacityTracker>,
    sink: Arc<dyn EventSink>,
    promoter: WaitlistPromoter,
    guards: Arc<DashMap<SessionId, Arc<Mutex<()>>>>,
}

impl ReservationService {
    /// Creates a reservation service over the given tables and tracker.
    pub fn new(stores: Stores, tracker: Arc<dyn CapacityTracker>, sink: Arc<dyn EventSink>) -> Self {
        let promoter = WaitlistPromoter::new(
            Arc::clone(&stores.sessions),
            Arc::clone(&stores.reservations),
            Arc::clone(&tracker),
            Arc::clone(&sink),
        );
        Self {
            stores,
            tracker,
            sink,
            promoter,
            guards: Arc::new(DashMap::new()),
        }
    }

    fn guard(&self, session_id: SessionId) -> Arc<Mutex<()>> {
        self.guards
            .entry(session_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Requests a reservation for an actor on a session.
    ///
    /// Returns the resulting state so the caller can distinguish "you're
    /// in" from "you're on the waitlist".
    pub async fn request(
        &self,
        actor_id: ActorId,
        session_id: SessionId,
    ) -> AppResult<ReservationOutcome> {
        let actor = self.stores.actors.require(actor_id).await?;
        if actor.is_suspended() {
            return Err(AppError::forbidden("Actor is suspended"));
        }

        let guard = self.guard(session_id);
        let _held = guard.lock().await;

        let session = self.stores.sessions.require(session_id).await?;
        if !session.accepts_reservations() {
            return Err(AppError::conflict(format!(
                "Session {session_id} is not open for reservations (status: {})",
                session.status
            )));
        }

        if let Some(existing) = self.stores.reservations.active_for(actor_id, session_id).await {
            return Err(AppError::conflict(format!(
                "Already reserved for this session (reservation {existing})"
            )));
        }

        let state = match self.tracker.try_reserve(session_id).await? {
            ReserveOutcome::Reserved => ReservationState::Confirmed,
            ReserveOutcome::Full => ReservationState::Waitlisted,
        };

        let reservation = Reservation::new(actor_id, session_id, state);
        let outcome = ReservationOutcome {
            reservation_id: reservation.id,
            state,
        };
        self.stores.reservations.insert(reservation).await;

        info!(
            actor_id = %actor_id,
            session_id = %session_id,
            reservation_id = %outcome.reservation_id,
            state = %state,
            "Reservation requested"
        );

        let event = match state {
            ReservationState::Confirmed => ReservationEvent::Confirmed {
                reservation_id: outcome.reservation_id,
                session_id,
                actor_id,
            },
            _ => ReservationEvent::Waitlisted {
                reservation_id: outcome.reservation_id,
                session_id,
                actor_id,
            },
        };
        self.sink
            .publish(DomainEvent::new(Some(actor_id), EventPayload::Reservation(event)))
            .await;

        Ok(outcome)
    }

    /// Cancels a reservation on behalf of its holder (or staff).
    ///
    /// Cancelling an already-cancelled reservation is a no-op returning
    /// the current state, so client retries stay simple. Cancelling a
    /// confirmed reservation releases its seat and promotes the waitlist
    /// within the same admission guard.
    pub async fn cancel(
        &self,
        reservation_id: ReservationId,
        caller_id: ActorId,
    ) -> AppResult<ReservationOutcome> {
        let reservation = self.stores.reservations.require(reservation_id).await?;
        let caller = self.stores.actors.require(caller_id).await?;
        if reservation.actor_id != caller_id && !caller.role.is_staff() {
            return Err(AppError::forbidden(
                "Only the reservation holder or staff may cancel a reservation",
            ));
        }

        self.cancel_under_guard(reservation_id, caller_id, "cancelled by holder")
            .await
    }

    /// Staff write-off of a confirmed reservation whose holder never
    /// checked in. Frees the seat and promotes the waitlist, exactly
    /// like a cancellation.
    pub async fn write_off_no_show(
        &self,
        reservation_id: ReservationId,
        staff_id: ActorId,
    ) -> AppResult<ReservationOutcome> {
        let staff = self.stores.actors.require(staff_id).await?;
        if !staff.role.is_staff() {
            return Err(AppError::forbidden("Only staff may write off a no-show"));
        }

        let reservation = self.stores.reservations.require(reservation_id).await?;
        if reservation.state != ReservationState::Confirmed {
            return Err(AppError::conflict(format!(
                "Only confirmed reservations can be written off (state: {})",
                reservation.state
            )));
        }
        let holder = self.stores.actors.require(reservation.actor_id).await?;
        if holder.checked_in {
            return Err(AppError::conflict("Actor has checked in; not a no-show"));
        }

        self.cancel_under_guard(reservation_id, staff_id, "no-show write-off")
            .await
    }

    async fn cancel_under_guard(
        &self,
        reservation_id: ReservationId,
        caller_id: ActorId,
        reason: &str,
    ) -> AppResult<ReservationOutcome> {
        let reservation = self.stores.reservations.require(reservation_id).await?;
        let session_id = reservation.session_id;

        let guard = self.guard(session_id);
        let _held = guard.lock().await;

        // Re-read under the guard; the state may have moved.
        let current = self.stores.reservations.require(reservation_id).await?;
        let outcome = ReservationOutcome {
            reservation_id,
            state: ReservationState::Cancelled,
        };

        let was = current.state;
        if was == ReservationState::Cancelled {
            return Ok(outcome);
        }

        self.stores
            .reservations
            .transition(reservation_id, ReservationState::Cancelled)
            .await?;

        info!(
            reservation_id = %reservation_id,
            session_id = %session_id,
            actor_id = %current.actor_id,
            was = %was,
            reason = reason,
            "Reservation cancelled"
        );
        self.sink
            .publish(DomainEvent::new(
                Some(caller_id),
                EventPayload::Reservation(ReservationEvent::Cancelled {
                    reservation_id,
                    session_id,
                    actor_id: current.actor_id,
                    reason: reason.to_string(),
                }),
            ))
            .await;

        if was == ReservationState::Confirmed {
            self.tracker.release(session_id).await?;
            self.promoter.promote(session_id).await?;
        }

        Ok(outcome)
    }

    /// Applies staff changes to a session.
    ///
    /// Rejects end-before-start times and location/time overlaps with
    /// other sessions. A capacity change is pushed to the tracker and,
    /// when it frees seats, promotes the waitlist within the same guard.
    pub async fn update_session(
        &self,
        session_id: SessionId,
        staff_id: ActorId,
        update: SessionUpdate,
    ) -> AppResult<EventSession> {
        let staff = self.stores.actors.require(staff_id).await?;
        if !staff.role.is_staff() {
            return Err(AppError::forbidden("Only staff may update a session"));
        }

        let guard = self.guard(session_id);
        let _held = guard.lock().await;

        let current = self.stores.sessions.require(session_id).await?;

        let starts_at = update.starts_at.unwrap_or(current.starts_at);
        let ends_at = update.ends_at.unwrap_or(current.ends_at);
        if ends_at <= starts_at {
            return Err(AppError::validation("End time must be after start time"));
        }

        let location = update.location.clone().unwrap_or_else(|| current.location.clone());
        let candidate = EventSession {
            starts_at,
            ends_at,
            location,
            ..current.clone()
        };
        for other in self.stores.sessions.list().await {
            if other.status != SessionStatus::Cancelled && candidate.overlaps_with(&other) {
                return Err(AppError::conflict(format!(
                    "Location conflict with session {} at {}",
                    other.id, other.location
                )));
            }
        }

        let new_capacity = update.capacity.map(SeatCapacity::from);
        let updated = self
            .stores
            .sessions
            .update(session_id, |session| {
                if let Some(title) = update.title {
                    session.title = title;
                }
                session.starts_at = candidate.starts_at;
                session.ends_at = candidate.ends_at;
                session.location = candidate.location.clone();
                if let Some(capacity) = new_capacity {
                    session.capacity = capacity;
                }
            })
            .await?;

        if let Some(capacity) = new_capacity {
            if capacity != current.capacity {
                self.tracker.set_capacity(session_id, capacity).await?;
                self.sink
                    .publish(DomainEvent::new(
                        Some(staff_id),
                        EventPayload::Session(SessionEvent::CapacityChanged {
                            session_id,
                            changed_by: staff_id,
                            old_capacity: current.capacity.as_max().unwrap_or(0),
                            new_capacity: capacity.as_max().unwrap_or(0),
                        }),
                    ))
                    .await;
                // Freed seats go to the waitlist in FIFO order.
                self.promoter.promote(session_id).await?;
            }
        }

        Ok(updated)
    }

    /// Staff deletion of a session.
    ///
    /// A session with active (non-cancelled) reservations is never
    /// destructively deleted; it is soft-cancelled instead, and its
    /// reservation history stays intact either way.
    pub async fn delete_session(
        &self,
        session_id: SessionId,
        staff_id: ActorId,
    ) -> AppResult<DeleteOutcome> {
        let staff = self.stores.actors.require(staff_id).await?;
        if !staff.role.is_staff() {
            return Err(AppError::forbidden("Only staff may delete a session"));
        }

        let guard = self.guard(session_id);
        let _held = guard.lock().await;

        self.stores.sessions.require(session_id).await?;

        if self.stores.reservations.has_active_for_session(session_id).await {
            self.stores
                .sessions
                .update(session_id, |session| {
                    session.status = SessionStatus::Cancelled;
                })
                .await?;
            info!(
                session_id = %session_id,
                staff_id = %staff_id,
                "Session with active reservations soft-cancelled"
            );
            self.sink
                .publish(DomainEvent::new(
                    Some(staff_id),
                    EventPayload::Session(SessionEvent::SoftCancelled {
                        session_id,
                        cancelled_by: staff_id,
                    }),
                ))
                .await;
            return Ok(DeleteOutcome::SoftCancelled);
        }

        self.stores.sessions.remove(session_id).await?;
        self.tracker.deregister(session_id).await?;
        info!(session_id = %session_id, staff_id = %staff_id, "Session deleted");
        self.sink
            .publish(DomainEvent::new(
                Some(staff_id),
                EventPayload::Session(SessionEvent::Deleted {
                    session_id,
                    deleted_by: staff_id,
                }),
            ))
            .await;
        Ok(DeleteOutcome::Deleted)
    }
}
