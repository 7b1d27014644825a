//! Real-time OKX trade processor
//!
//! # Architecture
//! - **core**: constants, symbol table, data records, clocks
//! - **data**: message ring, sliding windows, VWAP histories
//! - **ws** / **okx**: transport and frame parsing (tokio)
//! - **engine**: shared state + processor stage (dedicated threads)
//! - **scheduler** / **analytics**: minute ticks, VWAP and correlation workers
//! - **infrastructure**: config, diagnostics, record sinks

use okxflow::analytics::{correlation, vwap};
use okxflow::core::{
    MAX_LAG_MINUTES, MOVING_AVG_POINTS, N_SYMBOLS, WINDOW_CAPACITY, WINDOW_MINUTES,
};
use okxflow::engine::processor_loop;
use okxflow::infrastructure::logging::init_logging;
use okxflow::infrastructure::Sinks;
use okxflow::scheduler::scheduler_loop;
use okxflow::ws::run_feed;
use okxflow::{Config, Engine, EngineError, Result};
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    let config = Config::load()?;
    let _log_guard = init_logging(&config.logging)?;

    tracing::info!(
        symbols = N_SYMBOLS,
        window_minutes = WINDOW_MINUTES,
        window_capacity = WINDOW_CAPACITY,
        moving_avg_points = MOVING_AVG_POINTS,
        max_lag_minutes = MAX_LAG_MINUTES,
        "starting OKX real-time trade processor"
    );

    // All startup allocation happens here; failure is fatal.
    let sinks = Sinks::create(&config.storage)?;
    let engine = Arc::new(Engine::new(sinks));

    let mut handles = Vec::new();
    handles.push(spawn_thread("processor", &engine, |e| processor_loop(e))?);
    handles.push(spawn_thread("vwap-worker", &engine, |e| {
        vwap::vwap_worker(e)
    })?);
    handles.push(spawn_thread("corr-worker", &engine, |e| {
        correlation::correlation_worker(e)
    })?);
    handles.push(spawn_thread("scheduler", &engine, |e| scheduler_loop(e))?);

    // The transport and signal handling run on a single-threaded runtime;
    // everything latency-sensitive already has its own thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let feed = tokio::spawn(run_feed(Arc::clone(&engine), config.feed.clone()));

        wait_for_termination_signal().await;
        tracing::info!("termination signal received, shutting down");
        engine.initiate_shutdown();

        if let Err(e) = feed.await {
            tracing::error!(error = %e, "feed task panicked");
        }
    });

    for handle in handles {
        let name = handle.thread().name().unwrap_or("worker").to_string();
        if handle.join().is_err() {
            tracing::error!(thread = %name, "thread panicked");
        }
    }

    let stats = engine.stats.snapshot();
    tracing::info!(
        received = stats.messages_received,
        dropped = stats.messages_dropped,
        parse_failures = stats.parse_failures,
        trades = stats.trades_processed,
        uptime_s = stats.uptime_seconds,
        "all threads joined, exiting"
    );

    Ok(())
}

fn spawn_thread(
    name: &str,
    engine: &Arc<Engine>,
    body: impl FnOnce(&Engine) + Send + 'static,
) -> Result<thread::JoinHandle<()>> {
    let engine = Arc::clone(engine);
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || body(&engine))
        .map_err(EngineError::Io)
}

/// Resolves on SIGINT or SIGTERM
async fn wait_for_termination_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
