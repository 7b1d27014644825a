//! Pipeline counters
//!
//! Lock-free counters updated from the ingest and processor hot paths,
//! snapshotted for the shutdown summary. Queue overflow is counted here
//! and nowhere else surfaced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Atomic pipeline counters
pub struct PipelineStats {
    /// Frames received from the transport
    messages_received: AtomicU64,
    /// Messages dropped by the ring's drop-oldest policy
    messages_dropped: AtomicU64,
    /// Frames that failed trade parsing (excluding acks/pongs)
    parse_failures: AtomicU64,
    /// Trades inserted into a sliding window
    trades_processed: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

/// Counter snapshot
#[derive(Debug, Clone, Copy)]
pub struct StatsSnapshot {
    pub messages_received: u64,
    pub messages_dropped: u64,
    pub parse_failures: u64,
    pub trades_processed: u64,
    pub uptime_seconds: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self {
            messages_received: AtomicU64::new(0),
            messages_dropped: AtomicU64::new(0),
            parse_failures: AtomicU64::new(0),
            trades_processed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    #[inline]
    pub fn record_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_trade(&self) {
        self.trades_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a current snapshot of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            trades_processed: self.trades_processed.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}
