//! Sliding window of trades with running sums for O(1) VWAP
//!
//! Each symbol owns one window: a pre-allocated ring of `Trade` plus
//! running `Σ price·size` and `Σ size` over the resident trades. Inserting
//! a trade first evicts entries older than the window span measured from
//! the new trade's timestamp, then evicts one more from the head if the
//! ring is at capacity, then appends and folds the new contribution into
//! the sums. Snapshots divide the two sums, so VWAP never rescans the ring.

use crate::core::Trade;
use std::sync::Mutex;

/// Per-symbol sliding window of trades
pub struct TradeWindow {
    inner: Mutex<WindowState>,
    window_ms: i64,
}

struct WindowState {
    buffer: Box<[Trade]>,
    head: usize,
    tail: usize,
    len: usize,
    sum_price_volume: f64,
    sum_volume: f64,
}

impl WindowState {
    /// Remove the head trade and back its contribution out of the sums
    #[inline]
    fn evict_head(&mut self) {
        let trade = self.buffer[self.head];
        self.sum_price_volume -= trade.price * trade.size;
        self.sum_volume -= trade.size;
        self.head = (self.head + 1) % self.buffer.len();
        self.len -= 1;
    }
}

impl TradeWindow {
    /// Create a window holding at most `capacity` trades spanning `window_ms`
    pub fn new(capacity: usize, window_ms: i64) -> Self {
        Self {
            inner: Mutex::new(WindowState {
                buffer: vec![Trade::default(); capacity].into_boxed_slice(),
                head: 0,
                tail: 0,
                len: 0,
                sum_price_volume: 0.0,
                sum_volume: 0.0,
            }),
            window_ms,
        }
    }

    /// Insert a trade, evicting entries that fall out of the window
    ///
    /// The eviction cutoff is referenced to the inserted trade's timestamp:
    /// a late trade older than the cutoff is still admitted and leaves on
    /// the next insertion that advances the cutoff past it.
    pub fn add_trade(&self, ts_ms: i64, price: f64, size: f64) {
        let mut state = self.inner.lock().unwrap();

        // 1. Time-based eviction from the head
        let cutoff = ts_ms - self.window_ms;
        while state.len > 0 && state.buffer[state.head].trade_ts_ms < cutoff {
            state.evict_head();
        }

        // 2. Capacity eviction keeps the insert live on anomalous bursts
        if state.len == state.buffer.len() {
            state.evict_head();
        }

        // 3. Insert and fold into the running sums
        let tail = state.tail;
        state.buffer[tail] = Trade {
            trade_ts_ms: ts_ms,
            price,
            size,
        };
        state.tail = (tail + 1) % state.buffer.len();
        state.len += 1;
        state.sum_price_volume += price * size;
        state.sum_volume += size;
    }

    /// Current VWAP over the resident trades; NaN when the window is empty
    pub fn snapshot_vwap(&self) -> f64 {
        let state = self.inner.lock().unwrap();
        if state.sum_volume > 0.0 {
            state.sum_price_volume / state.sum_volume
        } else {
            f64::NAN
        }
    }

    /// Number of resident trades
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Running `(Σ price·size, Σ size)` over the resident trades
    pub fn totals(&self) -> (f64, f64) {
        let state = self.inner.lock().unwrap();
        (state.sum_price_volume, state.sum_volume)
    }

    /// Oldest resident trade timestamp, if any
    pub fn oldest_ts_ms(&self) -> Option<i64> {
        let state = self.inner.lock().unwrap();
        if state.len > 0 {
            Some(state.buffer[state.head].trade_ts_ms)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{WINDOW_CAPACITY, WINDOW_MS};

    #[test]
    fn test_vwap_identity() {
        let window = TradeWindow::new(WINDOW_CAPACITY, WINDOW_MS);
        window.add_trade(1_000, 100.0, 2.0);
        window.add_trade(2_000, 110.0, 3.0);
        window.add_trade(3_000, 120.0, 5.0);

        // (100*2 + 110*3 + 120*5) / 10
        assert!((window.snapshot_vwap() - 113.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_window_is_nan() {
        let window = TradeWindow::new(16, WINDOW_MS);
        assert!(window.snapshot_vwap().is_nan());
    }

    #[test]
    fn test_time_based_eviction() {
        let window = TradeWindow::new(16, 60_000);
        window.add_trade(0, 100.0, 1.0);
        window.add_trade(60_001, 200.0, 1.0);

        assert_eq!(window.len(), 1);
        assert!((window.snapshot_vwap() - 200.0).abs() < 1e-9);
        let (_, sum_volume) = window.totals();
        assert!((sum_volume - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_trade_on_cutoff_boundary_survives() {
        // cutoff = ts - window; eviction requires strictly older than cutoff
        let window = TradeWindow::new(16, 60_000);
        window.add_trade(0, 100.0, 1.0);
        window.add_trade(60_000, 200.0, 1.0);

        assert_eq!(window.len(), 2);
        assert!((window.snapshot_vwap() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_capacity_eviction() {
        let window = TradeWindow::new(4, i64::MAX / 2);
        for i in 0..6 {
            window.add_trade(i, 100.0 + i as f64, 1.0);
        }

        assert_eq!(window.len(), 4);
        // Trades 0 and 1 were pushed out; 2..=5 remain.
        let (sum_pv, sum_v) = window.totals();
        assert!((sum_v - 4.0).abs() < 1e-12);
        assert!((sum_pv - (102.0 + 103.0 + 104.0 + 105.0)).abs() < 1e-9);
        assert_eq!(window.oldest_ts_ms(), Some(2));
    }

    #[test]
    fn test_late_trade_admitted_then_evicted() {
        // Eviction is referenced to the newest inserted timestamp, so a
        // trade already older than the cutoff is admitted and only leaves
        // when a later insert moves the cutoff past it.
        let window = TradeWindow::new(16, 60_000);
        window.add_trade(120_000, 100.0, 1.0);
        window.add_trade(10_000, 50.0, 1.0); // late arrival, stale on entry

        assert_eq!(window.len(), 2);

        window.add_trade(121_000, 100.0, 1.0);
        // cutoff = 61 000: the stale trade at 10 000 goes, 120 000 stays
        assert_eq!(window.len(), 2);
        assert_eq!(window.oldest_ts_ms(), Some(120_000));
        assert!((window.snapshot_vwap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_running_sums_track_residents() {
        let window = TradeWindow::new(64, 60_000);
        let mut expected_pv = 0.0;
        let mut expected_v = 0.0;
        for i in 0..50i64 {
            let (price, size) = (100.0 + (i % 7) as f64, 0.5 + (i % 3) as f64);
            window.add_trade(i * 1_000, price, size);
            expected_pv += price * size;
            expected_v += size;
        }
        // All trades span 49s, well inside the window: nothing evicted.
        let (sum_pv, sum_v) = window.totals();
        let total_mass = expected_pv.abs();
        assert!((sum_pv - expected_pv).abs() < 1e-6 * total_mass);
        assert!((sum_v - expected_v).abs() < 1e-6 * expected_v);
    }

    #[test]
    fn test_no_resident_older_than_window() {
        let window = TradeWindow::new(256, 60_000);
        let mut latest = 0;
        for i in 0..500i64 {
            let ts = i * 777;
            window.add_trade(ts, 100.0, 1.0);
            latest = latest.max(ts);
        }
        if let Some(oldest) = window.oldest_ts_ms() {
            assert!(oldest >= latest - 60_000);
        }
    }

    #[test]
    fn test_concurrent_inserts_keep_sums_consistent() {
        use std::sync::Arc;

        let window = Arc::new(TradeWindow::new(WINDOW_CAPACITY, WINDOW_MS));
        let mut handles = Vec::new();
        for t in 0..4 {
            let window = Arc::clone(&window);
            handles.push(std::thread::spawn(move || {
                for i in 0..1_000i64 {
                    window.add_trade(t * 1_000_000 + i, 100.0, 1.0);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let (sum_pv, sum_v) = window.totals();
        let len = window.len() as f64;
        assert!((sum_v - len).abs() < 1e-6);
        assert!((sum_pv - 100.0 * len).abs() < 1e-3);
    }
}
