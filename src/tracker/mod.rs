//! The tracking table: per-payload records and the state machine that
//! keeps the set of visible codes temporally stable.

/// Per-payload tracking record and lifecycle state
pub mod record;
/// The payload-to-record registry and its per-frame phases
pub mod table;

pub use record::{TrackState, TrackedCode, UNKNOWN_LABEL};
pub use table::TrackingTable;
