//! WebSocket transport for the OKX public feed

pub mod connection;
pub mod feed;

pub use connection::{ConnectionState, WebSocketConnection, WebSocketError};
pub use feed::run_feed;
