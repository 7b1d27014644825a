//! Per-minute analytics
//!
//! Two workers slaved to the scheduler's barrier pair: the VWAP worker
//! snapshots every sliding window and extends the histories, then the
//! correlation worker searches those histories for the best lagged
//! cross-instrument match. A two-party phase barrier between them orders
//! every history append before any correlation read within a tick.

pub mod correlation;
pub mod vwap;

pub use correlation::{best_lagged_match, pearson, LagMatch};
