//! In-memory entity tables.
//!
//! These stand in for the platform's relational store, which is outside
//! the engine's scope. Single-node only, like the rest of the in-memory
//! engine state. Reservation rows are never removed; cancellation is a
//! state change, so audit history survives session deletion.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use meethub_core::AppError;
use meethub_core::AppResult;
use meethub_core::types::{ActorId, ConnectionId, ReservationId, SessionId};
use meethub_entity::{Actor, ActorPair, Connection, EventSession, Reservation, ReservationState};

/// Table of registered actors.
#[derive(Debug, Default)]
pub struct ActorStore {
    actors: Mutex<HashMap<ActorId, Actor>>,
}

impl ActorStore {
    /// Inserts or replaces an actor.
    pub async fn upsert(&self, actor: Actor) {
        self.actors.lock().await.insert(actor.id, actor);
    }

    /// Looks up an actor, or errors with `NOT_FOUND`.
    pub async fn require(&self, actor_id: ActorId) -> AppResult<Actor> {
        self.actors
            .lock()
            .await
            .get(&actor_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Actor {actor_id} not found")))
    }

    /// Marks an actor as checked in.
    pub async fn set_checked_in(&self, actor_id: ActorId, checked_in: bool) -> AppResult<()> {
        let mut actors = self.actors.lock().await;
        let actor = actors
            .get_mut(&actor_id)
            .ok_or_else(|| AppError::not_found(format!("Actor {actor_id} not found")))?;
        actor.checked_in = checked_in;
        Ok(())
    }
}

/// Table of event sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, EventSession>>,
}

impl SessionStore {
    /// Inserts or replaces a session.
    pub async fn upsert(&self, session: EventSession) {
        self.sessions.lock().await.insert(session.id, session);
    }

    /// Looks up a session, or errors with `NOT_FOUND`.
    pub async fn require(&self, session_id: SessionId) -> AppResult<EventSession> {
        self.sessions
            .lock()
            .await
            .get(&session_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Session {session_id} not found")))
    }

    /// Applies a mutation to a stored session.
    pub async fn update<F>(&self, session_id: SessionId, mutate: F) -> AppResult<EventSession>
    where
        F: FnOnce(&mut EventSession),
    {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or_else(|| AppError::not_found(format!("Session {session_id} not found")))?;
        mutate(session);
        Ok(session.clone())
    }

    /// Removes a session (hard delete).
    pub async fn remove(&self, session_id: SessionId) -> AppResult<()> {
        self.sessions
            .lock()
            .await
            .remove(&session_id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Session {session_id} not found")))
    }

    /// Snapshot of all sessions, for location-conflict checks.
    pub async fn list(&self) -> Vec<EventSession> {
        self.sessions.lock().await.values().cloned().collect()
    }
}

/// Table of reservations with an active-pair index.
///
/// The index maps each (actor, session) pair to its single non-cancelled
/// reservation, enforcing the at-most-one-active invariant with a plain
/// map lookup.
#[derive(Debug, Default)]
pub struct ReservationStore {
    inner: Mutex<ReservationTable>,
}

#[derive(Debug, Default)]
struct ReservationTable {
    rows: HashMap<ReservationId, Reservation>,
    active_by_pair: HashMap<(ActorId, SessionId), ReservationId>,
}

impl ReservationStore {
    /// Inserts a new reservation, indexing it if active.
    pub async fn insert(&self, reservation: Reservation) {
        let mut table = self.inner.lock().await;
        if reservation.is_active() {
            table
                .active_by_pair
                .insert((reservation.actor_id, reservation.session_id), reservation.id);
        }
        table.rows.insert(reservation.id, reservation);
    }

    /// Looks up a reservation, or errors with `NOT_FOUND`.
    pub async fn require(&self, reservation_id: ReservationId) -> AppResult<Reservation> {
        self.inner
            .lock()
            .await
            .rows
            .get(&reservation_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Reservation {reservation_id} not found")))
    }

    /// The active reservation id for an (actor, session) pair, if any.
    pub async fn active_for(&self, actor_id: ActorId, session_id: SessionId) -> Option<ReservationId> {
        self.inner
            .lock()
            .await
            .active_by_pair
            .get(&(actor_id, session_id))
            .copied()
    }

    /// Transitions a reservation to a new state, keeping the index
    /// consistent. Rejects transitions the state machine forbids.
    pub async fn transition(
        &self,
        reservation_id: ReservationId,
        to: ReservationState,
    ) -> AppResult<Reservation> {
        let mut table = self.inner.lock().await;
        let row = table
            .rows
            .get_mut(&reservation_id)
            .ok_or_else(|| AppError::not_found(format!("Reservation {reservation_id} not found")))?;

        if !row.state.can_transition_to(to) {
            return Err(AppError::conflict(format!(
                "Illegal reservation transition {} -> {}",
                row.state, to
            )));
        }

        row.state = to;
        row.transitioned_at = chrono::Utc::now();
        let snapshot = row.clone();

        if to == ReservationState::Cancelled {
            table
                .active_by_pair
                .remove(&(snapshot.actor_id, snapshot.session_id));
        }

        Ok(snapshot)
    }

    /// Waitlisted reservations for a session in FIFO order (request time,
    /// ties broken by reservation id).
    pub async fn waitlist_for(&self, session_id: SessionId) -> Vec<Reservation> {
        let table = self.inner.lock().await;
        let mut waitlist: Vec<Reservation> = table
            .rows
            .values()
            .filter(|r| r.session_id == session_id && r.state == ReservationState::Waitlisted)
            .cloned()
            .collect();
        waitlist.sort_by_key(Reservation::fifo_key);
        waitlist
    }

    /// Whether any non-cancelled reservation exists for a session.
    pub async fn has_active_for_session(&self, session_id: SessionId) -> bool {
        self.inner
            .lock()
            .await
            .active_by_pair
            .keys()
            .any(|(_, sid)| *sid == session_id)
    }

    /// All reservations for a session, in any state.
    pub async fn all_for_session(&self, session_id: SessionId) -> Vec<Reservation> {
        self.inner
            .lock()
            .await
            .rows
            .values()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect()
    }
}

/// Table of active connections keyed by canonical pair.
#[derive(Debug, Default)]
pub struct ConnectionStore {
    inner: Mutex<ConnectionTable>,
}

#[derive(Debug, Default)]
struct ConnectionTable {
    by_pair: HashMap<ActorPair, Connection>,
    pair_by_id: HashMap<ConnectionId, ActorPair>,
}

impl ConnectionStore {
    /// Inserts a new connection.
    pub async fn insert(&self, connection: Connection) {
        let mut table = self.inner.lock().await;
        table.pair_by_id.insert(connection.id, connection.pair);
        table.by_pair.insert(connection.pair, connection);
    }

    /// The active connection for a pair, if any.
    pub async fn get(&self, pair: ActorPair) -> Option<Connection> {
        self.inner.lock().await.by_pair.get(&pair).cloned()
    }

    /// Applies a mutation to the stored connection for a pair.
    pub async fn update<F>(&self, pair: ActorPair, mutate: F) -> Option<Connection>
    where
        F: FnOnce(&mut Connection),
    {
        let mut table = self.inner.lock().await;
        let connection = table.by_pair.get_mut(&pair)?;
        mutate(connection);
        Some(connection.clone())
    }

    /// Removes the active connection for a pair, returning it.
    pub async fn remove(&self, pair: ActorPair) -> Option<Connection> {
        let mut table = self.inner.lock().await;
        let connection = table.by_pair.remove(&pair)?;
        table.pair_by_id.remove(&connection.id);
        Some(connection)
    }
}

/// Bundle of all engine tables, shared across services.
#[derive(Debug, Default, Clone)]
pub struct Stores {
    /// Actor table.
    pub actors: Arc<ActorStore>,
    /// Session table.
    pub sessions: Arc<SessionStore>,
    /// Reservation table.
    pub reservations: Arc<ReservationStore>,
    /// Connection table.
    pub connections: Arc<ConnectionStore>,
}
