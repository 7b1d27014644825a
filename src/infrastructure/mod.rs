//! Infrastructure - cold path only
//!
//! This module contains non-latency-critical code:
//! - Configuration management
//! - Diagnostic logging setup
//! - Record sinks (trade, latency, VWAP, correlation, scheduler, system)
//! - Pipeline counters and process resource sampling

pub mod config;
pub mod logging;
pub mod sinks;
pub mod stats;
pub mod system_monitor;

pub use sinks::Sinks;
pub use stats::PipelineStats;
