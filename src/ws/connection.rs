//! WebSocket connection wrapper
//!
//! Low-latency WebSocket client using tokio-tungstenite:
//! - Connect timeout
//! - TCP_NODELAY on plain streams (send frames immediately)
//! - No logging in the receive path

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{timeout, Instant};
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// Errors that can occur with WebSocket connections
#[derive(Debug, thiserror::Error)]
pub enum WebSocketError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Send failed: {0}")]
    SendFailed(String),
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),
    #[error("Timeout")]
    Timeout,
    #[error("Not connected")]
    NotConnected,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, WebSocketError>;

/// WebSocket connection to the exchange
pub struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    state: ConnectionState,
    /// Last activity timestamp
    last_activity: Instant,
}

impl WebSocketConnection {
    /// Connect to a WebSocket endpoint
    ///
    /// # Arguments
    /// * `url` - WebSocket URL (wss:// or ws://)
    pub async fn connect(url: &str) -> Result<Self> {
        let connect_future = connect_async(url);
        let (ws_stream, _) = timeout(Duration::from_secs(10), connect_future)
            .await
            .map_err(|_| WebSocketError::Timeout)?
            .map_err(|e| WebSocketError::ConnectionFailed(e.to_string()))?;

        // Disable Nagle's algorithm on plain streams; TLS streams keep OS
        // defaults.
        if let MaybeTlsStream::Plain(ref tcp) = ws_stream.get_ref() {
            tcp.set_nodelay(true)
                .map_err(|e| WebSocketError::ConnectionFailed(e.to_string()))?;
        }

        Ok(Self {
            stream: ws_stream,
            state: ConnectionState::Connected,
            last_activity: Instant::now(),
        })
    }

    /// Send a message
    pub async fn send(&mut self, msg: Message) -> Result<()> {
        if self.state != ConnectionState::Connected {
            return Err(WebSocketError::NotConnected);
        }

        self.stream
            .send(msg)
            .await
            .map_err(|e| WebSocketError::SendFailed(e.to_string()))?;

        self.last_activity = Instant::now();
        Ok(())
    }

    /// Send a text message
    #[inline]
    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.send(Message::text(text)).await
    }

    /// Receive a message
    ///
    /// Returns `Ok(None)` on graceful close. Ping frames are answered by
    /// the protocol layer on the next send/flush.
    pub async fn recv(&mut self) -> Result<Option<Message>> {
        if self.state != ConnectionState::Connected {
            return Err(WebSocketError::NotConnected);
        }

        match self.stream.next().await {
            Some(Ok(msg)) => {
                self.last_activity = Instant::now();
                if let Message::Close(_) = &msg {
                    self.state = ConnectionState::Disconnected;
                }
                Ok(Some(msg))
            }
            Some(Err(e)) => Err(WebSocketError::ReceiveFailed(e.to_string())),
            None => {
                self.state = ConnectionState::Disconnected;
                Ok(None)
            }
        }
    }

    /// Get current connection state
    #[inline(always)]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Check if connected
    #[inline(always)]
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Get time since last activity
    #[inline(always)]
    pub fn idle_duration(&self) -> Duration {
        self.last_activity.elapsed()
    }

    /// Close the connection gracefully
    pub async fn close(&mut self) -> Result<()> {
        if self.state == ConnectionState::Connected {
            let _ = self
                .stream
                .close(None)
                .await
                .map_err(|e| WebSocketError::SendFailed(e.to_string()));
            self.state = ConnectionState::Disconnected;
        }
        Ok(())
    }
}
