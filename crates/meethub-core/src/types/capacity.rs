//! Seat capacity resolution types.

use serde::{Deserialize, Serialize};

/// Resolved seat capacity for an event session.
///
/// A session either has a fixed number of seats or is unbounded. The
/// storage convention of `0` (or unset) meaning "unlimited" is mapped to
/// [`SeatCapacity::Unlimited`] at the type level so the rest of the engine
/// never has to special-case zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatCapacity {
    /// A fixed maximum number of confirmed seats.
    Bounded(u32),
    /// No seat limit; every request is confirmed.
    Unlimited,
}

impl SeatCapacity {
    /// Check whether a given confirmed count fills this capacity.
    pub fn is_full_at(&self, confirmed: u32) -> bool {
        match self {
            Self::Bounded(max) => confirmed >= *max,
            Self::Unlimited => false,
        }
    }

    /// Number of free seats at the given confirmed count, or `None` for
    /// unlimited capacity.
    pub fn free_at(&self, confirmed: u32) -> Option<u32> {
        match self {
            Self::Bounded(max) => Some(max.saturating_sub(confirmed)),
            Self::Unlimited => None,
        }
    }

    /// Return the numeric capacity, or `None` for unlimited.
    pub fn as_max(&self) -> Option<u32> {
        match self {
            Self::Bounded(max) => Some(*max),
            Self::Unlimited => None,
        }
    }
}

impl From<u32> for SeatCapacity {
    /// Convert a `u32` to a `SeatCapacity`. `0` means unlimited.
    fn from(value: u32) -> Self {
        if value == 0 {
            Self::Unlimited
        } else {
            Self::Bounded(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_capacity() {
        let cap = SeatCapacity::Bounded(3);
        assert!(!cap.is_full_at(2));
        assert!(cap.is_full_at(3));
        assert!(cap.is_full_at(4));
        assert_eq!(cap.free_at(1), Some(2));
        assert_eq!(cap.free_at(5), Some(0));
    }

    #[test]
    fn test_unlimited() {
        let cap = SeatCapacity::Unlimited;
        assert!(!cap.is_full_at(0));
        assert!(!cap.is_full_at(u32::MAX));
        assert_eq!(cap.free_at(100), None);
    }

    #[test]
    fn test_from_u32() {
        assert_eq!(SeatCapacity::from(0), SeatCapacity::Unlimited);
        assert_eq!(SeatCapacity::from(5), SeatCapacity::Bounded(5));
    }
}
