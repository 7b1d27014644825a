//! Bounded message ring between ingest and the processor
//!
//! FIFO ring with the one-slot-unused convention: `(tail + 1) % cap == head`
//! means full, so occupancy never exceeds capacity − 1 and no separate size
//! field needs reconciling with the indices. The producer never blocks:
//! when the ring is full the oldest message is dropped so the pipeline
//! stays real-time under bursts. The consumer blocks on a condition
//! variable until a message arrives or the queue is closed.

use crate::core::RawMessage;
use std::sync::{Condvar, Mutex};

/// Thread-safe bounded ring of raw messages
pub struct MessageQueue {
    inner: Mutex<RingState>,
    not_empty: Condvar,
}

struct RingState {
    buffer: Box<[RawMessage]>,
    head: usize,
    tail: usize,
    closed: bool,
}

impl RingState {
    #[inline(always)]
    fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    #[inline(always)]
    fn is_full(&self) -> bool {
        (self.tail + 1) % self.buffer.len() == self.head
    }

    #[inline(always)]
    fn len(&self) -> usize {
        let cap = self.buffer.len();
        (self.tail + cap - self.head) % cap
    }
}

impl MessageQueue {
    /// Create a ring holding at most `capacity - 1` messages
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "ring needs at least one usable slot");
        Self {
            inner: Mutex::new(RingState {
                buffer: vec![RawMessage::default(); capacity].into_boxed_slice(),
                head: 0,
                tail: 0,
                closed: false,
            }),
            not_empty: Condvar::new(),
        }
    }

    /// Enqueue a message, dropping the oldest if the ring is full
    ///
    /// Never blocks beyond the lock. Returns `true` if an old message was
    /// dropped to make room.
    pub fn push(&self, msg: &RawMessage) -> bool {
        let mut state = self.inner.lock().unwrap();

        let mut dropped = false;
        while state.is_full() {
            state.head = (state.head + 1) % state.buffer.len();
            dropped = true;
        }

        let tail = state.tail;
        state.buffer[tail] = *msg;
        state.tail = (tail + 1) % state.buffer.len();
        self.not_empty.notify_one();

        dropped
    }

    /// Dequeue the oldest message, blocking while the ring is empty
    ///
    /// Returns `None` once the queue is closed and drained.
    pub fn pop(&self) -> Option<RawMessage> {
        let mut state = self.inner.lock().unwrap();

        while state.is_empty() && !state.closed {
            state = self.not_empty.wait(state).unwrap();
        }

        if state.is_empty() {
            return None;
        }

        let msg = state.buffer[state.head];
        state.head = (state.head + 1) % state.buffer.len();
        Some(msg)
    }

    /// Close the queue and wake every blocked consumer
    ///
    /// Messages already enqueued remain poppable; further pushes are still
    /// accepted but the pipeline is expected to be shutting down.
    pub fn close(&self) {
        let mut state = self.inner.lock().unwrap();
        state.closed = true;
        self.not_empty.notify_all();
    }

    /// Current occupancy
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
