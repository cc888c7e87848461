//! Connection-related domain events.

use serde::{Deserialize, Serialize};

use crate::types::{ActorId, ConnectionId};

/// Events related to actor-to-actor connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConnectionEvent {
    /// A new connection edge was created.
    Created {
        /// The connection ID.
        connection_id: ConnectionId,
        /// The actor who initiated the connection.
        initiator_id: ActorId,
        /// The actor on the other side.
        target_id: ActorId,
        /// The method used (qr_scan or manual_entry).
        method: String,
    },
    /// A connection was removed by one of its sides.
    Removed {
        /// The connection ID.
        connection_id: ConnectionId,
        /// The actor who removed the connection.
        removed_by: ActorId,
        /// The actor on the other side.
        other_id: ActorId,
    },
}
