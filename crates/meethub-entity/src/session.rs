//! Event session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use meethub_core::types::{SeatCapacity, SessionId};

/// A capacity-bounded event slot.
///
/// Sessions are created by staff. Capacity and status are mutable;
/// deletion is only permitted when no reservation history exists,
/// otherwise the session is soft-cancelled so reservation history stays
/// intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSession {
    /// Unique session identifier.
    pub id: SessionId,
    /// Session title.
    pub title: String,
    /// Seat capacity.
    pub capacity: SeatCapacity,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// When the session starts.
    pub starts_at: DateTime<Utc>,
    /// When the session ends.
    pub ends_at: DateTime<Utc>,
    /// Where the session takes place.
    pub location: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

impl EventSession {
    /// Creates a scheduled session with a fresh id.
    pub fn new(
        title: impl Into<String>,
        capacity: SeatCapacity,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            title: title.into(),
            capacity,
            status: SessionStatus::Scheduled,
            starts_at,
            ends_at,
            location: location.into(),
            created_at: Utc::now(),
        }
    }

    /// Whether the session currently accepts reservation requests.
    pub fn accepts_reservations(&self) -> bool {
        self.status == SessionStatus::Scheduled
    }

    /// Whether this session's time range overlaps another's at the same
    /// location. The test is half-open: back-to-back sessions where one
    /// ends exactly when the other starts do not overlap.
    pub fn overlaps_with(&self, other: &EventSession) -> bool {
        self.id != other.id
            && self.location == other.location
            && other.starts_at < self.ends_at
            && other.ends_at > self.starts_at
    }
}

/// Lifecycle status of an event session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Planned and open for reservations.
    Scheduled,
    /// Currently running.
    InProgress,
    /// Finished.
    Completed,
    /// Cancelled by staff.
    Cancelled,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session(location: &str, start_hour: u32, end_hour: u32) -> EventSession {
        EventSession {
            id: SessionId::new(),
            title: "test".to_string(),
            capacity: SeatCapacity::from(10),
            status: SessionStatus::Scheduled,
            starts_at: Utc.with_ymd_and_hms(2026, 3, 14, start_hour, 0, 0).unwrap(),
            ends_at: Utc.with_ymd_and_hms(2026, 3, 14, end_hour, 0, 0).unwrap(),
            location: location.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_overlap_same_location() {
        let a = session("Room 101", 10, 11);
        let b = session("Room 101", 10, 12);
        assert!(a.overlaps_with(&b));
        assert!(b.overlaps_with(&a));
    }

    #[test]
    fn test_no_overlap_different_location() {
        let a = session("Room 101", 10, 11);
        let b = session("Room 102", 10, 11);
        assert!(!a.overlaps_with(&b));
    }

    #[test]
    fn test_back_to_back_does_not_overlap() {
        let a = session("Room 101", 10, 11);
        let b = session("Room 101", 11, 12);
        assert!(!a.overlaps_with(&b));
    }

    #[test]
    fn test_session_does_not_overlap_itself() {
        let a = session("Room 101", 10, 11);
        assert!(!a.overlaps_with(&a.clone()));
    }

    #[test]
    fn test_only_scheduled_accepts_reservations() {
        let mut s = session("Room 101", 10, 11);
        assert!(s.accepts_reservations());
        s.status = SessionStatus::InProgress;
        assert!(!s.accepts_reservations());
        s.status = SessionStatus::Cancelled;
        assert!(!s.accepts_reservations());
    }
}
