//! Minute-boundary scheduler
//!
//! Triggers the analytics workers once per wall-clock minute with the work
//! *end* landing on the boundary: an EMA of recent work durations pulls
//! the wakeup earlier by the predicted amount, and deadlines advance by a
//! constant period on the monotonic axis so relative-sleep drift cannot
//! accumulate. `MinuteSchedule` is the pure deadline/EMA state machine;
//! `scheduler_loop` is the thread that sleeps, releases the barrier pair
//! and records drift and system metrics.

use crate::core::time::{minute_floor_ms, now_monotonic_ns, now_ms};
use crate::core::{MS_PER_MINUTE, NS_PER_MS};
use crate::engine::Engine;
use crate::infrastructure::system_monitor::{memory_usage_mb, CpuSampler};
use std::sync::atomic::Ordering;

/// Scheduler period: one minute on the monotonic axis
pub const PERIOD_NS: i64 = MS_PER_MINUTE * NS_PER_MS;

const EMA_ALPHA: f64 = 0.2;
/// Duration estimates are clamped here so one I/O stall cannot poison the
/// wakeup prediction.
const EMA_MAX_NS: f64 = 100.0 * NS_PER_MS as f64;

/// Planned wakeup for the next tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wakeup {
    /// Absolute monotonic instant to sleep until
    pub target_ns: i64,
    /// The minute deadline this tick is aimed at
    pub scheduled_ns: i64,
    /// Set when the compensated target was already in the past
    pub late_by_ns: Option<i64>,
}

/// Deadline and duration-prediction state
#[derive(Debug, Clone)]
pub struct MinuteSchedule {
    period_ns: i64,
    scheduled_ns: i64,
    ema_duration_ns: f64,
}

impl MinuteSchedule {
    /// Schedule aligned to the next period boundary after `now_ns`
    pub fn starting_at(now_ns: i64) -> Self {
        Self::with_period(now_ns, PERIOD_NS)
    }

    /// Schedule with an explicit period
    pub fn with_period(now_ns: i64, period_ns: i64) -> Self {
        assert!(period_ns > 0);
        Self {
            period_ns,
            scheduled_ns: (now_ns / period_ns + 1) * period_ns,
            ema_duration_ns: 0.0,
        }
    }

    /// Plan the next wakeup from the current instant
    ///
    /// Advances the deadline past `now_ns` (covering arbitrarily long
    /// stalls), then compensates by the predicted work duration. A target
    /// already in the past degrades to an immediate wakeup and reports how
    /// late the schedule is.
    pub fn next_wakeup(&mut self, now_ns: i64) -> Wakeup {
        while self.scheduled_ns <= now_ns {
            self.scheduled_ns += self.period_ns;
        }

        let predicted_ns = self.ema_duration_ns.round() as i64;
        let target_ns = self.scheduled_ns - predicted_ns;
        if target_ns <= now_ns {
            Wakeup {
                target_ns: now_ns,
                scheduled_ns: self.scheduled_ns,
                late_by_ns: Some(now_ns - target_ns),
            }
        } else {
            Wakeup {
                target_ns,
                scheduled_ns: self.scheduled_ns,
                late_by_ns: None,
            }
        }
    }

    /// Fold a completed tick's work duration into the EMA and advance the
    /// deadline one period
    pub fn complete_tick(&mut self, work_duration_ns: i64) {
        self.ema_duration_ns =
            EMA_ALPHA * work_duration_ns as f64 + (1.0 - EMA_ALPHA) * self.ema_duration_ns;
        self.ema_duration_ns = self.ema_duration_ns.clamp(0.0, EMA_MAX_NS);
        self.scheduled_ns += self.period_ns;
    }

    /// Current duration estimate in nanoseconds
    pub fn ema_duration_ns(&self) -> f64 {
        self.ema_duration_ns
    }
}

/// Scheduler thread body
///
/// Releases both workers through the start barrier each minute, waits for
/// them on the done barrier, then records drift and system metrics. On
/// shutdown it performs one final poisoned rendezvous so workers blocked
/// on either barrier always get a matching partner.
pub fn scheduler_loop(engine: &Engine) {
    let mut cpu = CpuSampler::new();
    let mut schedule = MinuteSchedule::starting_at(now_monotonic_ns());

    while !engine.shutdown.is_set() {
        let wakeup = schedule.next_wakeup(now_monotonic_ns());
        if let Some(late_by_ns) = wakeup.late_by_ns {
            tracing::warn!(
                late_by_ms = late_by_ns / NS_PER_MS,
                "missed schedule window, executing immediately"
            );
        }

        if !engine.shutdown.sleep_until_monotonic(wakeup.target_ns) {
            break;
        }

        // Canonical minute stamp for this tick, visible to both workers
        // before they are released.
        let minute_ms = minute_floor_ms(now_ms());
        engine.tick_minute_ms.store(minute_ms, Ordering::Release);
        engine.tick_is_final.store(false, Ordering::Release);

        let work_start_ns = now_monotonic_ns();
        engine.start_barrier.wait();
        engine.done_barrier.wait();
        let work_end_ns = now_monotonic_ns();

        schedule.complete_tick(work_end_ns - work_start_ns);

        let drift_ns = work_end_ns - wakeup.scheduled_ns;
        engine.sinks.log_scheduler(
            wakeup.scheduled_ns / NS_PER_MS,
            work_end_ns / NS_PER_MS,
            drift_ns,
        );
        engine
            .sinks
            .log_system(minute_ms, cpu.sample(), memory_usage_mb());
    }

    // Final rendezvous: whatever round the workers are in, they observe the
    // poisoned tick after the start barrier and run straight through to the
    // done barrier before exiting.
    engine.tick_is_final.store(true, Ordering::Release);
    engine.start_barrier.wait();
    engine.done_barrier.wait();
}
