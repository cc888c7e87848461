//! Connection entity model and canonical pair key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use meethub_core::types::{ActorId, ConnectionId};

/// Canonical unordered pair of actors.
///
/// The two sides are stored in UUID order, so `{A, B}` and `{B, A}`
/// produce the same key regardless of who initiated. This is what makes
/// the at-most-one-connection-per-pair invariant enforceable with a
/// plain map lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorPair {
    /// The lower of the two actor ids.
    pub first: ActorId,
    /// The higher of the two actor ids.
    pub second: ActorId,
}

impl ActorPair {
    /// Builds the canonical pair for two actors.
    ///
    /// Returns `None` if both sides are the same actor; a self-connection
    /// is not a pair.
    pub fn new(a: ActorId, b: ActorId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { first: a, second: b }),
            std::cmp::Ordering::Greater => Some(Self { first: b, second: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Whether the given actor is one of the pair's sides.
    pub fn contains(&self, actor_id: ActorId) -> bool {
        self.first == actor_id || self.second == actor_id
    }

    /// The other side of the pair, if `actor_id` is a member.
    pub fn other(&self, actor_id: ActorId) -> Option<ActorId> {
        if actor_id == self.first {
            Some(self.second)
        } else if actor_id == self.second {
            Some(self.first)
        } else {
            None
        }
    }
}

/// How a connection was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectMethod {
    /// Scanning the other actor's QR badge.
    QrScan,
    /// Entering the other actor's short code manually.
    ManualEntry,
}

impl ConnectMethod {
    /// Stable snake_case name used in events and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QrScan => "qr_scan",
            Self::ManualEntry => "manual_entry",
        }
    }
}

impl std::fmt::Display for ConnectMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An undirected connection edge between two actors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection identifier.
    pub id: ConnectionId,
    /// Canonical unordered pair of the connected actors.
    pub pair: ActorPair,
    /// The actor who initiated the connection.
    pub initiated_by: ActorId,
    /// How the connection was made.
    pub method: ConnectMethod,
    /// Private note kept by the pair's first side.
    pub note_first: Option<String>,
    /// Private note kept by the pair's second side.
    pub note_second: Option<String>,
    /// When the connection was created.
    pub created_at: DateTime<Utc>,
}

impl Connection {
    /// Creates a new connection between the initiator and target.
    ///
    /// Returns `None` for a self-connection.
    pub fn new(initiated_by: ActorId, target: ActorId, method: ConnectMethod) -> Option<Self> {
        let pair = ActorPair::new(initiated_by, target)?;
        Some(Self {
            id: ConnectionId::new(),
            pair,
            initiated_by,
            method,
            note_first: None,
            note_second: None,
            created_at: Utc::now(),
        })
    }

    /// Sets the private note for the given side, if it is a member.
    pub fn set_note(&mut self, actor_id: ActorId, note: impl Into<String>) -> bool {
        if actor_id == self.pair.first {
            self.note_first = Some(note.into());
            true
        } else if actor_id == self.pair.second {
            self.note_second = Some(note.into());
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_pair_is_canonical() {
        let a = ActorId::from_uuid(Uuid::from_u128(1));
        let b = ActorId::from_uuid(Uuid::from_u128(2));
        let ab = ActorPair::new(a, b).expect("pair");
        let ba = ActorPair::new(b, a).expect("pair");
        assert_eq!(ab, ba);
        assert_eq!(ab.first, a);
        assert_eq!(ab.second, b);
    }

    #[test]
    fn test_self_pair_rejected() {
        let a = ActorId::new();
        assert!(ActorPair::new(a, a).is_none());
    }

    #[test]
    fn test_pair_membership() {
        let a = ActorId::new();
        let b = ActorId::new();
        let c = ActorId::new();
        let pair = ActorPair::new(a, b).expect("pair");
        assert!(pair.contains(a));
        assert!(pair.contains(b));
        assert!(!pair.contains(c));
        assert_eq!(pair.other(a), Some(b));
        assert_eq!(pair.other(c), None);
    }

    #[test]
    fn test_notes_per_side() {
        let a = ActorId::from_uuid(Uuid::from_u128(1));
        let b = ActorId::from_uuid(Uuid::from_u128(2));
        let mut conn = Connection::new(b, a, ConnectMethod::QrScan).expect("connection");
        assert_eq!(conn.initiated_by, b);
        assert!(conn.set_note(a, "met at the keynote"));
        assert_eq!(conn.note_first.as_deref(), Some("met at the keynote"));
        assert!(conn.note_second.is_none());
        assert!(!conn.set_note(ActorId::new(), "stranger"));
    }
}
