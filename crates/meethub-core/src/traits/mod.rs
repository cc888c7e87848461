//! Core traits defined in `meethub-core` and implemented by the engine.

pub mod capacity_tracker;
pub mod event_sink;
pub mod quota_ledger;

pub use capacity_tracker::{CapacityTracker, Occupancy, ReserveOutcome};
pub use event_sink::EventSink;
pub use quota_ledger::{QuotaDecision, QuotaLedger};
