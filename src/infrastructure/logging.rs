//! Diagnostic logging setup
//!
//! Console output for operators plus a non-blocking daily-rolling file
//! appender under the configured log directory. Data-plane records never
//! go through tracing; they have dedicated sinks.

use crate::infrastructure::config::LogConfig;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize the tracing subscriber
///
/// Returns a WorkerGuard which must be kept alive for the duration of the
/// program so buffered log lines are flushed on exit.
pub fn init_logging(config: &LogConfig) -> std::io::Result<WorkerGuard> {
    fs::create_dir_all(&config.dir)?;

    let appender = RollingFileAppender::new(Rotation::DAILY, &config.dir, "okxflow");
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!(dir = %config.dir.display(), "logging initialized");

    Ok(guard)
}
