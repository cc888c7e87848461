//! Quota-related domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ActionType, ActorId};

/// Events related to rolling-window quota decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuotaEvent {
    /// A unit of quota was consumed.
    Consumed {
        /// The actor consuming quota.
        actor_id: ActorId,
        /// The governed action.
        action: ActionType,
        /// Units used within the current window, including this one.
        used: u32,
        /// The configured limit, if any.
        limit: Option<u32>,
    },
    /// An action was denied because the window is exhausted.
    Denied {
        /// The actor who was denied.
        actor_id: ActorId,
        /// The governed action.
        action: ActionType,
        /// When the window will admit one more unit.
        retry_at: DateTime<Utc>,
    },
}
