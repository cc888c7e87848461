//! Quota ledger trait for rolling-window admission decisions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::{ActionType, ActorId};

/// Result of attempting to consume one unit of quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotaDecision {
    /// The action may proceed; one unit was recorded.
    Allowed {
        /// Units used within the current window, including this one.
        used: u32,
        /// The configured limit, if any.
        limit: Option<u32>,
    },
    /// The window is exhausted; nothing was recorded.
    Denied {
        /// The earliest instant at which the window will admit one more
        /// unit (oldest counted consumption + window length).
        retry_at: DateTime<Utc>,
    },
}

impl QuotaDecision {
    /// Whether the decision admits the action.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Trait for atomic rolling-window quota accounting.
///
/// Implementations must make the check-and-record a single atomic
/// operation per (actor, action) key: two concurrent `try_consume` calls
/// must never both succeed when only one unit of quota remains. The
/// quota count is mutated exclusively through this trait.
#[async_trait]
pub trait QuotaLedger: Send + Sync + std::fmt::Debug {
    /// Attempts to consume one unit of quota for the actor and action.
    ///
    /// `role` selects any per-role limit override.
    async fn try_consume(
        &self,
        actor_id: ActorId,
        role: &str,
        action: ActionType,
    ) -> AppResult<QuotaDecision>;

    /// Removes the most recent consumption for the actor and action.
    ///
    /// Called when the surrounding action failed after its quota was
    /// consumed, so quota is never charged for an action that did not
    /// actually happen. Removing from an empty window is a no-op.
    async fn refund(&self, actor_id: ActorId, action: ActionType) -> AppResult<()>;

    /// Units counted within the current window for the actor and action.
    async fn used(&self, actor_id: ActorId, action: ActionType) -> AppResult<u32>;
}
