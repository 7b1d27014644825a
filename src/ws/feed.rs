//! OKX feed task: connect, subscribe, ingest, reconnect
//!
//! Runs on the tokio runtime while the rest of the pipeline runs on
//! dedicated threads. The receive path does the bare minimum per frame -
//! stamp the receive time, copy the bytes, enqueue - so the socket is
//! drained as fast as the exchange produces. Reconnects use exponential
//! backoff starting at 2s and capped at 60s, reset after a successful
//! subscribe.

use crate::core::time::now_ms;
use crate::core::RawMessage;
use crate::engine::Engine;
use crate::infrastructure::config::FeedConfig;
use crate::okx::subscribe_payload;
use crate::ws::connection::WebSocketConnection;
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::tungstenite::protocol::Message;

const INITIAL_BACKOFF_SECS: u64 = 2;
const MAX_BACKOFF_SECS: u64 = 60;

/// Transport task body; returns only on shutdown
pub async fn run_feed(engine: Arc<Engine>, config: FeedConfig) {
    let mut backoff_secs = INITIAL_BACKOFF_SECS;

    while !engine.shutdown.is_set() {
        match WebSocketConnection::connect(&config.url).await {
            Ok(mut conn) => {
                tracing::info!(url = %config.url, "websocket connection established");
                match conn.send_text(&subscribe_payload()).await {
                    Ok(()) => {
                        tracing::info!("subscribed to trades channel for all instruments");
                        backoff_secs = INITIAL_BACKOFF_SECS;
                        read_loop(&engine, &mut conn, &config).await;
                    }
                    Err(e) => tracing::error!(error = %e, "failed to send subscribe frame"),
                }
                let _ = conn.close().await;
            }
            Err(e) => tracing::error!(error = %e, "websocket connection failed"),
        }

        if engine.shutdown.is_set() {
            break;
        }

        tracing::warn!(backoff_secs, "websocket disconnected, reconnecting");
        tokio::select! {
            _ = engine.ws_cancel.notified() => break,
            _ = tokio::time::sleep(Duration::from_secs(backoff_secs)) => {}
        }
        backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
    }

    tracing::info!("feed task stopped");
}

/// Drain one connection until it drops or shutdown is requested
async fn read_loop(engine: &Engine, conn: &mut WebSocketConnection, config: &FeedConfig) {
    let ping_period = Duration::from_secs(config.ping_interval_secs.max(1));
    let mut ping = tokio::time::interval_at(tokio::time::Instant::now() + ping_period, ping_period);
    ping.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = engine.ws_cancel.notified() => return,
            _ = ping.tick() => {
                // OKX drops connections idle for 30s; a text "ping" keeps
                // it open and elicits a "pong" the parser skips.
                if conn.idle_duration() >= ping_period {
                    if let Err(e) = conn.send_text("ping").await {
                        tracing::warn!(error = %e, "keep-alive ping failed");
                        return;
                    }
                }
            }
            incoming = conn.recv() => match incoming {
                Ok(Some(Message::Text(text))) => ingest(engine, text.as_bytes()),
                Ok(Some(Message::Binary(data))) => ingest(engine, &data),
                Ok(Some(_)) => {} // protocol ping/pong/close frames
                Ok(None) => {
                    tracing::warn!("websocket closed by peer");
                    return;
                }
                Err(e) => {
                    tracing::error!(error = %e, "websocket receive failed");
                    return;
                }
            }
        }
    }
}

/// Ingest one frame: stamp, copy, enqueue. No parsing here.
#[inline]
fn ingest(engine: &Engine, frame: &[u8]) {
    let msg = RawMessage::from_frame(frame, now_ms());
    if engine.queue.push(&msg) {
        engine.stats.record_dropped();
    }
    engine.stats.record_received();
}
