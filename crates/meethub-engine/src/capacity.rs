//! In-memory capacity tracker.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use meethub_core::AppError;
use meethub_core::AppResult;
use meethub_core::traits::{CapacityTracker, Occupancy, ReserveOutcome};
use meethub_core::types::{SeatCapacity, SessionId};

/// Seat accounting for one session.
#[derive(Debug)]
struct SlotState {
    /// The session's seat capacity.
    capacity: SeatCapacity,
    /// Number of confirmed seats currently held.
    confirmed: u32,
}

/// In-memory capacity tracker using one Tokio mutex per session.
///
/// Each session's slot state is guarded independently, so reservations
/// against different sessions never contend. `try_reserve` performs the
/// check and the increment under the same lock, which is what keeps the
/// confirmed count at or below capacity under arbitrary interleavings.
///
/// Suitable for single-node deployments only.
#[derive(Debug, Clone, Default)]
pub struct MemoryCapacityTracker {
    slots: Arc<DashMap<SessionId, Arc<Mutex<SlotState>>>>,
}

impl MemoryCapacityTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, session_id: SessionId) -> AppResult<Arc<Mutex<SlotState>>> {
        self.slots
            .get(&session_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                AppError::not_found(format!("Session {session_id} is not registered for capacity"))
            })
    }
}

#[async_trait]
impl CapacityTracker for MemoryCapacityTracker {
    async fn register(&self, session_id: SessionId, capacity: SeatCapacity) -> AppResult<()> {
        self.slots.entry(session_id).or_insert_with(|| {
            debug!(session_id = %session_id, capacity = ?capacity, "Session registered");
            Arc::new(Mutex::new(SlotState {
                capacity,
                confirmed: 0,
            }))
        });
        Ok(())
    }

    async fn set_capacity(&self, session_id: SessionId, capacity: SeatCapacity) -> AppResult<()> {
        let slot = self.slot(session_id)?;
        let mut state = slot.lock().await;
        info!(
            session_id = %session_id,
            old = ?state.capacity,
            new = ?capacity,
            confirmed = state.confirmed,
            "Session capacity updated"
        );
        state.capacity = capacity;
        Ok(())
    }

    async fn try_reserve(&self, session_id: SessionId) -> AppResult<ReserveOutcome> {
        let slot = self.slot(session_id)?;
        let mut state = slot.lock().await;

        if state.capacity.is_full_at(state.confirmed) {
            return Ok(ReserveOutcome::Full);
        }

        state.confirmed += 1;
        debug!(
            session_id = %session_id,
            confirmed = state.confirmed,
            capacity = ?state.capacity,
            "Seat reserved"
        );
        Ok(ReserveOutcome::Reserved)
    }

    async fn release(&self, session_id: SessionId) -> AppResult<()> {
        let slot = self.slot(session_id)?;
        let mut state = slot.lock().await;

        if state.confirmed == 0 {
            warn!(
                session_id = %session_id,
                "Attempted to release a seat that was not reserved"
            );
            return Ok(());
        }

        state.confirmed -= 1;
        debug!(
            session_id = %session_id,
            confirmed = state.confirmed,
            "Seat released"
        );
        Ok(())
    }

    async fn occupancy(&self, session_id: SessionId) -> AppResult<Occupancy> {
        let slot = self.slot(session_id)?;
        let state = slot.lock().await;
        Ok(Occupancy {
            capacity: state.capacity,
            confirmed: state.confirmed,
        })
    }

    async fn deregister(&self, session_id: SessionId) -> AppResult<()> {
        self.slots.remove(&session_id);
        Ok(())
    }
}
