//! VWAP worker
//!
//! On each minute tick: snapshot every symbol's sliding-window VWAP in
//! table order, append it to that symbol's history (NaN for an empty
//! window, so histories advance one point per minute unconditionally),
//! and emit a CSV record.

use crate::engine::Engine;

/// One tick of VWAP snapshots across all symbols
pub fn run_tick(engine: &Engine, minute_ms: i64) {
    for state in &engine.symbols {
        let vwap = state.window.snapshot_vwap();
        state.history.append(minute_ms, vwap);
        engine.sinks.log_vwap(state.symbol, minute_ms, vwap);
    }
}

/// Worker thread body: runs the snapshot phase of every tick
pub fn vwap_worker(engine: &Engine) {
    loop {
        engine.start_barrier.wait();
        let quitting = engine.is_tick_final();
        if !quitting {
            run_tick(engine, engine.tick_minute());
        }
        engine.phase_barrier.wait();
        engine.done_barrier.wait();
        if quitting {
            break;
        }
    }
}
