//! Shared type definitions: typed identifiers, seat capacity, action types.

pub mod action;
pub mod capacity;
pub mod id;

pub use action::ActionType;
pub use capacity::SeatCapacity;
pub use id::{ActorId, ConnectionId, ReservationId, SessionId};
