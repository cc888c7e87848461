//! Rolling-window quota configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::ActionType;

/// Rolling-window quota configuration.
///
/// Limits count actions within the trailing window from "now" (a sliding
/// window, not a calendar-day reset, so there is no burst-at-midnight
/// bypass). A limit applies per actor and per action type. Actions with
/// no configured limit are unlimited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Length of the rolling window in hours.
    #[serde(default = "default_window_hours")]
    pub window_hours: u64,
    /// Per-action limits within one window. Key is the action type.
    #[serde(default = "default_limits")]
    pub limits: HashMap<ActionType, u32>,
    /// Per-role limit overrides. Outer key is the role name, inner map
    /// overrides individual action limits for actors with that role.
    #[serde(default)]
    pub by_role: HashMap<String, HashMap<ActionType, u32>>,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
            limits: default_limits(),
            by_role: HashMap::new(),
        }
    }
}

impl QuotaConfig {
    /// The rolling window as a chrono duration.
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.window_hours as i64)
    }

    /// Resolve the limit for an action performed by an actor with the
    /// given role. Role overrides win over the per-action defaults;
    /// `None` means unlimited.
    pub fn limit_for(&self, action: ActionType, role: &str) -> Option<u32> {
        self.by_role
            .get(role)
            .and_then(|overrides| overrides.get(&action))
            .or_else(|| self.limits.get(&action))
            .copied()
    }
}

fn default_window_hours() -> u64 {
    24
}

fn default_limits() -> HashMap<ActionType, u32> {
    let mut map = HashMap::new();
    map.insert(ActionType::Connection, 50);
    map.insert(ActionType::Message, 40);
    map.insert(ActionType::OpportunityPost, 10);
    map.insert(ActionType::ProfileUpdate, 20);
    map.insert(ActionType::ConversationCreate, 20);
    map
}
