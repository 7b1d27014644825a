//! Core application engine
//!
//! `Engine` owns every piece of state the stages share: the per-symbol
//! windows and histories, the ingest ring, the worker barriers, the
//! shutdown flag and the record sinks. It is built once in `main` and
//! handed to each stage at spawn time; nothing here is a process global
//! except what the signal path needs, and that is a single atomic with
//! one setter.

use crate::core::time::{now_monotonic_ns, now_ms};
use crate::core::{Symbol, HISTORY_CAPACITY, QUEUE_CAPACITY, WINDOW_CAPACITY, WINDOW_MS};
use crate::data::{MessageQueue, TradeWindow, VwapHistory};
use crate::infrastructure::{PipelineStats, Sinks};
use crate::okx::{parse_trade_frame, ParseError};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Barrier, Condvar, Mutex};
use std::time::Duration;

/// Cooperative shutdown flag with an attached sleeper wakeup
///
/// The flag itself is a bare atomic (readable from anywhere without a
/// lock, monotonic false→true); the mutex/condvar pair exists so the
/// scheduler's absolute sleep can be cut short the moment shutdown is
/// requested.
pub struct ShutdownFlag {
    requested: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
            lock: Mutex::new(()),
            wake: Condvar::new(),
        }
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Set the flag and wake every sleeper
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
        let _guard = self.lock.lock().unwrap();
        self.wake.notify_all();
    }

    /// Sleep until the absolute monotonic instant `target_ns`
    ///
    /// Spurious wakeups retry toward the same target. Returns `false` if
    /// shutdown was requested before the target was reached.
    pub fn sleep_until_monotonic(&self, target_ns: i64) -> bool {
        let mut guard = self.lock.lock().unwrap();
        loop {
            if self.is_set() {
                return false;
            }
            let now_ns = now_monotonic_ns();
            if now_ns >= target_ns {
                return true;
            }
            let remaining = Duration::from_nanos((target_ns - now_ns) as u64);
            let (next_guard, _) = self.wake.wait_timeout(guard, remaining).unwrap();
            guard = next_guard;
        }
    }
}

impl Default for ShutdownFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// All real-time and historical state for one instrument
pub struct SymbolState {
    pub symbol: Symbol,
    pub window: TradeWindow,
    pub history: VwapHistory,
}

/// Shared engine state, one per process
pub struct Engine {
    pub symbols: Vec<SymbolState>,
    pub queue: MessageQueue,
    pub shutdown: ShutdownFlag,
    /// Wakes the websocket task out of reads and backoff sleeps
    pub ws_cancel: tokio::sync::Notify,

    /// Tick rendezvous: scheduler + both workers
    pub start_barrier: Barrier,
    /// Orders VWAP appends before correlation reads; workers only
    pub phase_barrier: Barrier,
    /// Tick completion: scheduler + both workers
    pub done_barrier: Barrier,

    /// Canonical minute stamp of the current tick, written by the
    /// scheduler before it releases the start barrier
    pub tick_minute_ms: AtomicI64,
    /// Poison marker for the scheduler's final rendezvous; written before
    /// the start barrier, so every party of a round reads the same value
    pub tick_is_final: AtomicBool,

    pub stats: PipelineStats,
    pub sinks: Sinks,
}

impl Engine {
    pub fn new(sinks: Sinks) -> Self {
        let symbols = Symbol::ALL
            .iter()
            .map(|&symbol| SymbolState {
                symbol,
                window: TradeWindow::new(WINDOW_CAPACITY, WINDOW_MS),
                history: VwapHistory::new(HISTORY_CAPACITY),
            })
            .collect();

        Self {
            symbols,
            queue: MessageQueue::new(QUEUE_CAPACITY),
            shutdown: ShutdownFlag::new(),
            ws_cancel: tokio::sync::Notify::new(),
            start_barrier: Barrier::new(3),
            phase_barrier: Barrier::new(2),
            done_barrier: Barrier::new(3),
            tick_minute_ms: AtomicI64::new(0),
            tick_is_final: AtomicBool::new(false),
            stats: PipelineStats::new(),
            sinks,
        }
    }

    /// The minute stamp workers should attribute the current tick to
    #[inline]
    pub fn tick_minute(&self) -> i64 {
        self.tick_minute_ms.load(Ordering::Acquire)
    }

    /// Whether the current tick is the scheduler's final rendezvous
    #[inline]
    pub fn is_tick_final(&self) -> bool {
        self.tick_is_final.load(Ordering::Acquire)
    }

    /// Begin graceful shutdown: set the flag, then wake every waiter
    pub fn initiate_shutdown(&self) {
        self.shutdown.request();
        self.queue.close();
        self.ws_cancel.notify_waiters();
    }
}

/// Processor thread body
///
/// Drains the ingest ring: parse, append the raw frame to the symbol's
/// trade log, record latency, then insert into the sliding window. Any
/// malformed frame is discarded; nothing here ever aborts the loop except
/// queue closure.
pub fn processor_loop(engine: &Engine) {
    while let Some(msg) = engine.queue.pop() {
        let parsed = match parse_trade_frame(msg.bytes()) {
            Ok(parsed) => parsed,
            Err(ParseError::NotATrade) => continue, // acks, pongs, events
            Err(e) => {
                engine.stats.record_parse_failure();
                tracing::warn!(error = %e, "discarding unparseable trade frame");
                continue;
            }
        };

        engine.sinks.log_trade_raw(parsed.symbol, msg.bytes());

        let exchange_ts_ms = parsed.ts_ms.unwrap_or_else(now_ms);
        let process_ts_ms = now_ms();
        engine.sinks.log_latency(
            parsed.symbol,
            exchange_ts_ms,
            msg.receive_ts_ms,
            process_ts_ms,
        );

        engine.symbols[parsed.symbol.index()].window.add_trade(
            exchange_ts_ms,
            parsed.price,
            parsed.size,
        );
        engine.stats.record_trade();
    }
}

/// Build an engine whose sinks write under a unique scratch directory.
/// Returns the directory so tests can inspect and remove it.
#[cfg(test)]
pub fn test_engine(tag: &str) -> (Engine, std::path::PathBuf) {
    use crate::infrastructure::config::StorageConfig;

    let dir = std::env::temp_dir().join(format!("okxflow_engine_{tag}_{}", std::process::id()));
    let config = StorageConfig {
        data_dir: dir.clone(),
        fsync_per_write: false,
    };
    let sinks = Sinks::create(&config).expect("scratch sinks");
    (Engine::new(sinks), dir)
}
