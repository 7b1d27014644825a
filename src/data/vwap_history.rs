//! Per-symbol ring of per-minute VWAP points
//!
//! Appended once per minute tick by the VWAP worker and read by the
//! correlation worker. `with_view` runs a caller closure with the ring
//! lock held, so a lagged scan over a peer's history observes a single
//! consistent state even while that peer is being appended to.

use crate::core::VwapPoint;
use std::sync::Mutex;

/// Bounded history of `(minute_ts_ms, vwap)` points
pub struct VwapHistory {
    inner: Mutex<HistState>,
}

struct HistState {
    buffer: Box<[VwapPoint]>,
    head: usize,
    tail: usize,
    len: usize,
}

/// Read access to a locked history, indexed in insertion order
pub struct HistoryView<'a> {
    state: &'a HistState,
}

impl HistoryView<'_> {
    /// Number of resident points
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.state.len
    }

    pub fn is_empty(&self) -> bool {
        self.state.len == 0
    }

    /// The `i`-th resident point, `0` being the oldest
    #[inline(always)]
    pub fn point(&self, i: usize) -> VwapPoint {
        debug_assert!(i < self.state.len);
        let idx = (self.state.head + i) % self.state.buffer.len();
        self.state.buffer[idx]
    }
}

impl VwapHistory {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0);
        Self {
            inner: Mutex::new(HistState {
                buffer: vec![VwapPoint::default(); capacity].into_boxed_slice(),
                head: 0,
                tail: 0,
                len: 0,
            }),
        }
    }

    /// Append a point, overwriting the oldest when full
    pub fn append(&self, minute_ts_ms: i64, vwap: f64) {
        let mut state = self.inner.lock().unwrap();

        if state.len == state.buffer.len() {
            state.head = (state.head + 1) % state.buffer.len();
            state.len -= 1;
        }

        let tail = state.tail;
        state.buffer[tail] = VwapPoint { minute_ts_ms, vwap };
        state.tail = (tail + 1) % state.buffer.len();
        state.len += 1;
    }

    /// Copy the last `out.len()` points in insertion order
    ///
    /// Returns `false` without touching `out` if fewer points are resident.
    pub fn get_recent(&self, out: &mut [VwapPoint]) -> bool {
        let state = self.inner.lock().unwrap();
        let n = out.len();
        if state.len < n {
            return false;
        }

        let start = state.len - n;
        for (i, slot) in out.iter_mut().enumerate() {
            let idx = (state.head + start + i) % state.buffer.len();
            *slot = state.buffer[idx];
        }
        true
    }

    /// Run `f` with the ring lock held
    ///
    /// Used by the correlation search so every candidate window for one
    /// target is read from the same consistent state.
    pub fn with_view<R>(&self, f: impl FnOnce(HistoryView<'_>) -> R) -> R {
        let state = self.inner.lock().unwrap();
        f(HistoryView { state: &*state })
    }

    /// Number of resident points
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
