//! Quota-governed action types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The set of actions subject to rolling-window quotas.
///
/// Being an enum rather than a free-form string means an unknown action
/// type is unrepresentable; callers cannot consume quota for an action
/// the configuration does not know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Creating a connection with another actor.
    Connection,
    /// Sending a direct message.
    Message,
    /// Posting an opportunity.
    OpportunityPost,
    /// Updating the actor's own profile.
    ProfileUpdate,
    /// Starting a new conversation thread.
    ConversationCreate,
}

impl ActionType {
    /// All action types, in declaration order.
    pub const ALL: [ActionType; 5] = [
        ActionType::Connection,
        ActionType::Message,
        ActionType::OpportunityPost,
        ActionType::ProfileUpdate,
        ActionType::ConversationCreate,
    ];

    /// Stable snake_case name used in configuration keys and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Message => "message",
            Self::OpportunityPost => "opportunity_post",
            Self::ProfileUpdate => "profile_update",
            Self::ConversationCreate => "conversation_create",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde_name() {
        let json = serde_json::to_string(&ActionType::OpportunityPost).expect("serialize");
        assert_eq!(json, "\"opportunity_post\"");
        assert_eq!(ActionType::OpportunityPost.to_string(), "opportunity_post");
    }

    #[test]
    fn test_all_is_exhaustive() {
        assert_eq!(ActionType::ALL.len(), 5);
    }
}
