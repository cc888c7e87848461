//! # meethub-entity
//!
//! Domain entity models for the MeetHub admission-control engine: actors,
//! event sessions, reservations, and connections, together with their
//! state machines and validation helpers.

pub mod actor;
pub mod connection;
pub mod reservation;
pub mod session;

pub use actor::{Actor, ActorRole, PrivacySettings};
pub use connection::{ActorPair, ConnectMethod, Connection};
pub use reservation::{Reservation, ReservationState};
pub use session::{EventSession, SessionStatus};
