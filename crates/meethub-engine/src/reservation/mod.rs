//! Reservation admission: request, cancellation, staff operations, and
//! FIFO waitlist promotion.

pub mod promoter;
pub mod service;

pub use promoter::WaitlistPromoter;
pub use service::{DeleteOutcome, ReservationOutcome, ReservationService, SessionUpdate};
