//! Core types and compile-time configuration
//!
//! This module contains the fundamental types used throughout the system:
//! - Symbol: interned identifier for the monitored instruments
//! - RawMessage / Trade / VwapPoint: pipeline data records
//! - Clock helpers: wall milliseconds, monotonic nanoseconds, minute math

pub mod market_data;
pub mod symbol;
pub mod time;

pub use market_data::{RawMessage, Trade, VwapPoint};
pub use symbol::Symbol;

/// Number of monitored instruments.
pub const N_SYMBOLS: usize = 8;

/// Sliding-window span for trade aggregation.
pub const WINDOW_MINUTES: i64 = 15;

/// Window span in milliseconds.
pub const WINDOW_MS: i64 = WINDOW_MINUTES * MS_PER_MINUTE;

/// Maximum trades resident in one symbol's sliding window.
pub const WINDOW_CAPACITY: usize = 50_000;

/// Number of recent per-minute VWAP points forming a correlation vector.
pub const MOVING_AVG_POINTS: usize = 8;

/// Maximum lag (minutes) searched during correlation analysis.
pub const MAX_LAG_MINUTES: usize = 60;

/// Per-symbol VWAP history depth: enough for the deepest lagged window.
pub const HISTORY_CAPACITY: usize = MAX_LAG_MINUTES + MOVING_AVG_POINTS;

/// Capacity of the raw message ring between ingest and the processor.
pub const QUEUE_CAPACITY: usize = 1024;

pub const MS_PER_MINUTE: i64 = 60_000;
pub const NS_PER_MS: i64 = 1_000_000;
pub const NS_PER_SEC: i64 = 1_000_000_000;
