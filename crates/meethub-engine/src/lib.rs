//! # meethub-engine
//!
//! The MeetHub admission-control engine. Decides, under concurrent
//! requests, whether a requested action may proceed given a finite seat
//! capacity or a rolling-window quota, with deterministic FIFO waitlist
//! promotion, exactly-once promotion semantics, and idempotent retries.
//!
//! The [`facade::AdmissionEngine`] is the single entry point; it is the
//! only code that mutates reservation and connection state. Seat counts
//! and quota counts are mutated exclusively through the
//! [`CapacityTracker`](meethub_core::traits::CapacityTracker) and
//! [`QuotaLedger`](meethub_core::traits::QuotaLedger) atomic operations.

pub mod capacity;
pub mod connection;
pub mod events;
pub mod facade;
pub mod quota;
pub mod reservation;
pub mod store;

pub use capacity::MemoryCapacityTracker;
pub use connection::ConnectOutcome;
pub use events::{CollectingEventSink, TracingEventSink};
pub use facade::AdmissionEngine;
pub use quota::MemoryQuotaLedger;
pub use reservation::{DeleteOutcome, ReservationOutcome, SessionUpdate};
