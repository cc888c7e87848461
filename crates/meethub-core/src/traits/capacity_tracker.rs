//! Capacity tracker trait for atomic seat accounting.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::{SeatCapacity, SessionId};

/// Result of attempting to reserve a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReserveOutcome {
    /// A seat was reserved; the confirmed count was incremented.
    Reserved,
    /// The session is at capacity. Not a failure: the caller waitlists.
    Full,
}

/// Snapshot of a session's seat accounting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Occupancy {
    /// The session's seat capacity.
    pub capacity: SeatCapacity,
    /// Number of confirmed seats currently held.
    pub confirmed: u32,
}

impl Occupancy {
    /// Whether at least one seat is free.
    pub fn has_free_seat(&self) -> bool {
        !self.capacity.is_full_at(self.confirmed)
    }
}

/// Trait for atomic seat reservation and release.
///
/// Implementations must guarantee that `try_reserve` is a single atomic
/// check-and-increment: under N concurrent calls against capacity C,
/// exactly min(N, remaining) succeed and the confirmed count never
/// exceeds C. The confirmed count is mutated exclusively through this
/// trait; no other code path may write to it.
#[async_trait]
pub trait CapacityTracker: Send + Sync + std::fmt::Debug {
    /// Registers a session with the given capacity. Idempotent; an
    /// already-registered session keeps its current confirmed count.
    async fn register(&self, session_id: SessionId, capacity: SeatCapacity) -> AppResult<()>;

    /// Updates a session's capacity without touching the confirmed count.
    async fn set_capacity(&self, session_id: SessionId, capacity: SeatCapacity) -> AppResult<()>;

    /// Attempts to atomically reserve one seat.
    ///
    /// Unlimited-capacity sessions always return [`ReserveOutcome::Reserved`].
    async fn try_reserve(&self, session_id: SessionId) -> AppResult<ReserveOutcome>;

    /// Releases one previously reserved seat.
    async fn release(&self, session_id: SessionId) -> AppResult<()>;

    /// Returns the current seat accounting for a session.
    async fn occupancy(&self, session_id: SessionId) -> AppResult<Occupancy>;

    /// Removes a session from the tracker (hard delete).
    async fn deregister(&self, session_id: SessionId) -> AppResult<()>;
}
