//! In-memory rolling-window quota ledger.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use meethub_core::AppResult;
use meethub_core::config::QuotaConfig;
use meethub_core::traits::{QuotaDecision, QuotaLedger};
use meethub_core::types::{ActionType, ActorId};

/// In-memory quota ledger with one independently guarded window per
/// (actor, action) key.
///
/// Each window is the deque of consumption timestamps within the trailing
/// configured period; entries age out lazily when the window is next
/// touched. The prune, the limit check, and the recording all happen
/// under the same per-key lock, so two concurrent consumers can never
/// both take the last remaining unit.
#[derive(Debug, Clone)]
pub struct MemoryQuotaLedger {
    config: QuotaConfig,
    windows: Arc<DashMap<(ActorId, ActionType), Arc<Mutex<VecDeque<DateTime<Utc>>>>>>,
}

impl MemoryQuotaLedger {
    /// Creates a ledger with the given quota configuration.
    pub fn new(config: QuotaConfig) -> Self {
        Self {
            config,
            windows: Arc::new(DashMap::new()),
        }
    }

    fn window(&self, actor_id: ActorId, action: ActionType) -> Arc<Mutex<VecDeque<DateTime<Utc>>>> {
        self.windows
            .entry((actor_id, action))
            .or_insert_with(|| Arc::new(Mutex::new(VecDeque::new())))
            .clone()
    }

    /// Consumption attempt with an explicit "now", for deterministic
    /// window tests. Production callers use [`QuotaLedger::try_consume`].
    pub async fn try_consume_at(
        &self,
        actor_id: ActorId,
        role: &str,
        action: ActionType,
        now: DateTime<Utc>,
    ) -> QuotaDecision {
        let limit = self.config.limit_for(action, role);
        let window_len = self.config.window();

        let window = self.window(actor_id, action);
        let mut entries = window.lock().await;

        // Age out entries whose window has fully elapsed.
        while let Some(oldest) = entries.front() {
            if *oldest + window_len <= now {
                entries.pop_front();
            } else {
                break;
            }
        }

        match limit {
            Some(0) => {
                info!(
                    actor_id = %actor_id,
                    action = %action,
                    "Action disabled by zero quota limit"
                );
                QuotaDecision::Denied {
                    retry_at: now + window_len,
                }
            }
            Some(max) if entries.len() as u32 >= max => {
                // The deque cannot be empty here: len >= max >= 1.
                let oldest = *entries.front().unwrap_or(&now);
                let retry_at = oldest + window_len;
                info!(
                    actor_id = %actor_id,
                    action = %action,
                    used = entries.len(),
                    limit = max,
                    retry_at = %retry_at,
                    "Quota exhausted"
                );
                QuotaDecision::Denied { retry_at }
            }
            _ => {
                entries.push_back(now);
                debug!(
                    actor_id = %actor_id,
                    action = %action,
                    used = entries.len(),
                    limit = ?limit,
                    "Quota consumed"
                );
                QuotaDecision::Allowed {
                    used: entries.len() as u32,
                    limit,
                }
            }
        }
    }
}

#[async_trait]
impl QuotaLedger for MemoryQuotaLedger {
    async fn try_consume(
        &self,
        actor_id: ActorId,
        role: &str,
        action: ActionType,
    ) -> AppResult<QuotaDecision> {
        Ok(self.try_consume_at(actor_id, role, action, Utc::now()).await)
    }

    async fn refund(&self, actor_id: ActorId, action: ActionType) -> AppResult<()> {
        let window = self.window(actor_id, action);
        let mut entries = window.lock().await;
        if entries.pop_back().is_some() {
            debug!(
                actor_id = %actor_id,
                action = %action,
                used = entries.len(),
                "Quota refunded"
            );
        }
        Ok(())
    }

    async fn used(&self, actor_id: ActorId, action: ActionType) -> AppResult<u32> {
        let now = Utc::now();
        let window_len = self.config.window();
        let window = self.window(actor_id, action);
        let mut entries = window.lock().await;
        while let Some(oldest) = entries.front() {
            if *oldest + window_len <= now {
                entries.pop_front();
            } else {
                break;
            }
        }
        Ok(entries.len() as u32)
    }
}
