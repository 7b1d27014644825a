//! Real-time OKX trade ingestion and analytics engine
//!
//! Consumes the OKX public trades websocket for a fixed set of instruments,
//! durably records every trade, maintains per-symbol sliding windows with
//! O(1) incremental VWAP, and emits per-minute VWAP and cross-instrument
//! lagged Pearson correlation records on a drift-compensated minute schedule.

pub mod analytics;
pub mod core;
pub mod data;
pub mod engine;
pub mod infrastructure;
pub mod okx;
pub mod scheduler;
pub mod ws;

// Re-export commonly used types
pub use engine::Engine;
pub use infrastructure::config::Config;

use thiserror::Error;

/// Main error type for the engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Configuration error: {0}")]
    Config(#[from] infrastructure::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EngineError>;
