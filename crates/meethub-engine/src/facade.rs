//! The admission engine facade.
//!
//! Single entry point for every admission decision. All state mutation
//! goes through here; callers outside this crate never touch the stores,
//! tracker, or ledger directly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use meethub_core::AppError;
use meethub_core::AppResult;
use meethub_core::config::EngineConfig;
use meethub_core::events::{DomainEvent, EventPayload, QuotaEvent};
use meethub_core::traits::{CapacityTracker, EventSink, Occupancy, QuotaDecision, QuotaLedger};
use meethub_core::types::{ActionType, ActorId, ReservationId, SeatCapacity, SessionId};
use meethub_entity::{Actor, ConnectMethod, Connection, EventSession, Reservation, SessionStatus};

use crate::capacity::MemoryCapacityTracker;
use crate::connection::{ConnectOutcome, ConnectionService};
use crate::events::TracingEventSink;
use crate::quota::MemoryQuotaLedger;
use crate::reservation::{DeleteOutcome, ReservationOutcome, ReservationService, SessionUpdate};
use crate::store::Stores;

/// The admission-control engine.
///
/// Composes the entity tables, the seat tracker, the quota ledger and the
/// two admission services behind one API. Cheap to clone; clones share
/// all state.
#[derive(Clone)]
pub struct AdmissionEngine {
    stores: Stores,
    tracker: Arc<dyn CapacityTracker>,
    ledger: Arc<dyn QuotaLedger>,
    sink: Arc<dyn EventSink>,
    reservations: ReservationService,
    connections: ConnectionService,
}

impl AdmissionEngine {
    /// Creates an engine with the given configuration and event sink.
    pub fn new(config: EngineConfig, sink: Arc<dyn EventSink>) -> Self {
        let stores = Stores::default();
        let tracker: Arc<dyn CapacityTracker> = Arc::new(MemoryCapacityTracker::new());
        let ledger: Arc<dyn QuotaLedger> = Arc::new(MemoryQuotaLedger::new(config.quota));
        let reservations =
            ReservationService::new(stores.clone(), Arc::clone(&tracker), Arc::clone(&sink));
        let connections =
            ConnectionService::new(stores.clone(), Arc::clone(&ledger), Arc::clone(&sink));
        Self {
            stores,
            tracker,
            ledger,
            sink,
            reservations,
            connections,
        }
    }

    /// Creates an engine that publishes events to the structured log.
    pub fn with_tracing_sink(config: EngineConfig) -> Self {
        Self::new(config, Arc::new(TracingEventSink))
    }

    // ---- actors --------------------------------------------------------

    /// Registers an actor (or replaces an existing registration).
    pub async fn register_actor(&self, actor: Actor) {
        info!(actor_id = %actor.id, role = %actor.role.as_str(), "Actor registered");
        self.stores.actors.upsert(actor).await;
    }

    /// Looks up an actor.
    pub async fn actor(&self, actor_id: ActorId) -> AppResult<Actor> {
        self.stores.actors.require(actor_id).await
    }

    /// Marks an actor as checked in at the venue.
    pub async fn check_in(&self, actor_id: ActorId) -> AppResult<()> {
        self.stores.actors.set_checked_in(actor_id, true).await
    }

    // ---- sessions ------------------------------------------------------

    /// Creates a scheduled session and registers its seat capacity.
    ///
    /// Rejects sessions whose time range overlaps a non-cancelled session
    /// at the same location.
    pub async fn create_session(
        &self,
        staff_id: ActorId,
        title: impl Into<String>,
        capacity: SeatCapacity,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        location: impl Into<String>,
    ) -> AppResult<EventSession> {
        let staff = self.stores.actors.require(staff_id).await?;
        if !staff.role.is_staff() {
            return Err(AppError::forbidden("Only staff may create a session"));
        }
        if ends_at <= starts_at {
            return Err(AppError::validation("End time must be after start time"));
        }

        let session = EventSession::new(title, capacity, starts_at, ends_at, location);
        for other in self.stores.sessions.list().await {
            if other.status != SessionStatus::Cancelled && session.overlaps_with(&other) {
                return Err(AppError::conflict(format!(
                    "Location conflict with session {} at {}",
                    other.id, other.location
                )));
            }
        }

        self.tracker.register(session.id, session.capacity).await?;
        self.stores.sessions.upsert(session.clone()).await;
        info!(
            session_id = %session.id,
            capacity = ?session.capacity,
            location = %session.location,
            "Session created"
        );
        Ok(session)
    }

    /// Looks up a session.
    pub async fn session(&self, session_id: SessionId) -> AppResult<EventSession> {
        self.stores.sessions.require(session_id).await
    }

    /// Current seat accounting for a session.
    pub async fn occupancy(&self, session_id: SessionId) -> AppResult<Occupancy> {
        self.tracker.occupancy(session_id).await
    }

    /// Applies staff edits to a session, promoting waitlisted actors if
    /// the capacity grew.
    pub async fn update_session(
        &self,
        session_id: SessionId,
        staff_id: ActorId,
        update: SessionUpdate,
    ) -> AppResult<EventSession> {
        self.reservations
            .update_session(session_id, staff_id, update)
            .await
    }

    /// Deletes a session, or soft-cancels it if reservations exist.
    pub async fn delete_session(
        &self,
        session_id: SessionId,
        staff_id: ActorId,
    ) -> AppResult<DeleteOutcome> {
        self.reservations.delete_session(session_id, staff_id).await
    }

    // ---- reservations --------------------------------------------------

    /// Requests a seat in a session: confirmed if a seat is free,
    /// waitlisted otherwise.
    pub async fn request_reservation(
        &self,
        actor_id: ActorId,
        session_id: SessionId,
    ) -> AppResult<ReservationOutcome> {
        self.reservations.request(actor_id, session_id).await
    }

    /// Cancels a reservation. Idempotent: cancelling an already-cancelled
    /// reservation succeeds without side effects.
    pub async fn cancel_reservation(
        &self,
        reservation_id: ReservationId,
        caller_id: ActorId,
    ) -> AppResult<ReservationOutcome> {
        self.reservations.cancel(reservation_id, caller_id).await
    }

    /// Staff write-off of a confirmed reservation whose holder never
    /// checked in, freeing the seat for the waitlist.
    pub async fn write_off_no_show(
        &self,
        reservation_id: ReservationId,
        staff_id: ActorId,
    ) -> AppResult<ReservationOutcome> {
        self.reservations
            .write_off_no_show(reservation_id, staff_id)
            .await
    }

    /// Looks up a reservation.
    pub async fn reservation(&self, reservation_id: ReservationId) -> AppResult<Reservation> {
        self.stores.reservations.require(reservation_id).await
    }

    /// Waitlisted reservations for a session in promotion order.
    pub async fn waitlist(&self, session_id: SessionId) -> Vec<Reservation> {
        self.stores.reservations.waitlist_for(session_id).await
    }

    // ---- connections ---------------------------------------------------

    /// Connects two actors, consuming one unit of the initiator's
    /// connection quota on creation. A duplicate attempt returns the
    /// existing connection and consumes nothing.
    pub async fn connect(
        &self,
        initiator_id: ActorId,
        target_id: ActorId,
        method: ConnectMethod,
    ) -> AppResult<ConnectOutcome> {
        self.connections
            .connect(initiator_id, target_id, method)
            .await
    }

    /// Removes the connection between two actors.
    pub async fn disconnect(&self, caller_id: ActorId, other_id: ActorId) -> AppResult<()> {
        self.connections.disconnect(caller_id, other_id).await
    }

    /// Sets the caller's private note on their connection with another
    /// actor.
    pub async fn set_connection_note(
        &self,
        caller_id: ActorId,
        other_id: ActorId,
        note: impl Into<String>,
    ) -> AppResult<()> {
        self.connections.set_note(caller_id, other_id, note).await
    }

    /// The active connection between two actors, if any.
    pub async fn connection_between(&self, a: ActorId, b: ActorId) -> Option<Connection> {
        self.connections.between(a, b).await
    }

    // ---- quota ---------------------------------------------------------

    /// Charges one unit of quota for a governed non-connection action
    /// (messages, opportunity posts, and the like), erroring with
    /// `RATE_LIMITED` when the window is exhausted.
    ///
    /// Connection quota is charged by [`connect`](Self::connect) itself;
    /// there is no reason to call this with [`ActionType::Connection`].
    pub async fn charge_action(&self, actor_id: ActorId, action: ActionType) -> AppResult<u32> {
        let actor = self.stores.actors.require(actor_id).await?;
        if actor.is_suspended() {
            return Err(AppError::forbidden("Actor is suspended"));
        }

        match self
            .ledger
            .try_consume(actor_id, actor.role.as_str(), action)
            .await?
        {
            QuotaDecision::Allowed { used, limit } => {
                self.sink
                    .publish(DomainEvent::new(
                        Some(actor_id),
                        EventPayload::Quota(QuotaEvent::Consumed {
                            actor_id,
                            action,
                            used,
                            limit,
                        }),
                    ))
                    .await;
                Ok(used)
            }
            QuotaDecision::Denied { retry_at } => {
                self.sink
                    .publish(DomainEvent::new(
                        Some(actor_id),
                        EventPayload::Quota(QuotaEvent::Denied {
                            actor_id,
                            action,
                            retry_at,
                        }),
                    ))
                    .await;
                Err(AppError::rate_limited(
                    format!("Quota exhausted for {action}"),
                    retry_at,
                ))
            }
        }
    }

    /// Refunds the most recent quota unit for an action that did not
    /// actually happen downstream.
    pub async fn refund_action(&self, actor_id: ActorId, action: ActionType) -> AppResult<()> {
        self.ledger.refund(actor_id, action).await
    }

    /// Units of quota used in the current window.
    pub async fn quota_used(&self, actor_id: ActorId, action: ActionType) -> AppResult<u32> {
        self.ledger.used(actor_id, action).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meethub_core::config::QuotaConfig;
    use meethub_core::error::ErrorKind;
    use meethub_entity::ActorRole;

    fn engine_with_limits(limits: &[(ActionType, u32)]) -> AdmissionEngine {
        let mut quota = QuotaConfig::default();
        for (action, limit) in limits {
            quota.limits.insert(*action, *limit);
        }
        AdmissionEngine::with_tracing_sink(EngineConfig { quota })
    }

    async fn staff(engine: &AdmissionEngine) -> ActorId {
        let actor = Actor::new("Organizer", ActorRole::Staff);
        let id = actor.id;
        engine.register_actor(actor).await;
        id
    }

    #[tokio::test]
    async fn test_create_session_requires_staff() {
        let engine = engine_with_limits(&[]);
        let attendee = Actor::new("Ada", ActorRole::Attendee);
        let attendee_id = attendee.id;
        engine.register_actor(attendee).await;

        let now = Utc::now();
        let err = engine
            .create_session(
                attendee_id,
                "Keynote",
                SeatCapacity::from(10),
                now,
                now + chrono::Duration::hours(1),
                "Main Hall",
            )
            .await
            .expect_err("should be forbidden");
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_create_session_rejects_location_overlap() {
        let engine = engine_with_limits(&[]);
        let staff_id = staff(&engine).await;
        let now = Utc::now();

        engine
            .create_session(
                staff_id,
                "Workshop A",
                SeatCapacity::from(5),
                now,
                now + chrono::Duration::hours(1),
                "Room 1",
            )
            .await
            .expect("first session");

        let err = engine
            .create_session(
                staff_id,
                "Workshop B",
                SeatCapacity::from(5),
                now + chrono::Duration::minutes(30),
                now + chrono::Duration::hours(2),
                "Room 1",
            )
            .await
            .expect_err("overlap should conflict");
        assert_eq!(err.kind, ErrorKind::Conflict);

        // Same time range elsewhere is fine.
        engine
            .create_session(
                staff_id,
                "Workshop B",
                SeatCapacity::from(5),
                now + chrono::Duration::minutes(30),
                now + chrono::Duration::hours(2),
                "Room 2",
            )
            .await
            .expect("different room");
    }

    #[tokio::test]
    async fn test_charge_action_denies_past_limit() {
        let engine = engine_with_limits(&[(ActionType::Message, 2)]);
        let actor = Actor::new("Ada", ActorRole::Attendee);
        let actor_id = actor.id;
        engine.register_actor(actor).await;

        assert_eq!(
            engine
                .charge_action(actor_id, ActionType::Message)
                .await
                .expect("first"),
            1
        );
        assert_eq!(
            engine
                .charge_action(actor_id, ActionType::Message)
                .await
                .expect("second"),
            2
        );

        let err = engine
            .charge_action(actor_id, ActionType::Message)
            .await
            .expect_err("third should be denied");
        assert_eq!(err.kind, ErrorKind::RateLimited);
        assert!(err.retry_at.is_some());

        // A refunded unit becomes available again.
        engine
            .refund_action(actor_id, ActionType::Message)
            .await
            .expect("refund");
        engine
            .charge_action(actor_id, ActionType::Message)
            .await
            .expect("after refund");
    }

    #[tokio::test]
    async fn test_suspended_actor_cannot_act() {
        let engine = engine_with_limits(&[]);
        let mut actor = Actor::new("Ada", ActorRole::Attendee);
        actor.suspended_at = Some(Utc::now());
        let actor_id = actor.id;
        engine.register_actor(actor).await;

        let err = engine
            .charge_action(actor_id, ActionType::Message)
            .await
            .expect_err("suspended");
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }
}
