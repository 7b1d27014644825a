//! Shared per-symbol containers and the ingest queue
//!
//! All three structures are bounded rings allocated once at startup:
//! - MessageQueue: producer/consumer hand-off between ingest and processor
//! - TradeWindow: time-based sliding window with running VWAP sums
//! - VwapHistory: per-minute VWAP points for the correlation search

pub mod message_queue;
pub mod trade_window;
pub mod vwap_history;

pub use message_queue::MessageQueue;
pub use trade_window::TradeWindow;
pub use vwap_history::{HistoryView, VwapHistory};
