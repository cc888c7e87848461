//! Event-session lifecycle domain events.

use serde::{Deserialize, Serialize};

use crate::types::{ActorId, SessionId};

/// Events related to event-session administration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A session's capacity was changed by staff.
    CapacityChanged {
        /// The session ID.
        session_id: SessionId,
        /// The staff member who made the change.
        changed_by: ActorId,
        /// The previous capacity (0 = unlimited).
        old_capacity: u32,
        /// The new capacity (0 = unlimited).
        new_capacity: u32,
    },
    /// A session with reservation history was soft-cancelled instead of
    /// being deleted.
    SoftCancelled {
        /// The session ID.
        session_id: SessionId,
        /// The staff member who requested deletion.
        cancelled_by: ActorId,
    },
    /// A session with no reservation history was hard-deleted.
    Deleted {
        /// The session ID.
        session_id: SessionId,
        /// The staff member who deleted it.
        deleted_by: ActorId,
    },
}
