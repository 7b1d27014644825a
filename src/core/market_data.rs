//! Pipeline data records
//!
//! `RawMessage` carries an unparsed websocket frame from ingest to the
//! processor inside a fixed-size buffer, so the message ring is allocated
//! once at startup and slots are reused by copy. `Trade` and `VwapPoint`
//! are the small Copy records held by the per-symbol rings.

/// Maximum raw frame bytes retained per message; longer frames truncate.
pub const MAX_FRAME_BYTES: usize = 1024;

/// Raw websocket frame with receive metadata, queued for the processor
#[derive(Clone, Copy)]
pub struct RawMessage {
    raw: [u8; MAX_FRAME_BYTES],
    raw_len: u16,
    /// Local wall-clock timestamp when the frame arrived
    pub receive_ts_ms: i64,
}

impl RawMessage {
    /// Capture a frame, truncating to the fixed buffer
    #[inline]
    pub fn from_frame(frame: &[u8], receive_ts_ms: i64) -> Self {
        let mut raw = [0u8; MAX_FRAME_BYTES];
        let len = frame.len().min(MAX_FRAME_BYTES);
        raw[..len].copy_from_slice(&frame[..len]);
        Self {
            raw,
            raw_len: len as u16,
            receive_ts_ms,
        }
    }

    /// The retained frame bytes
    #[inline(always)]
    pub fn bytes(&self) -> &[u8] {
        &self.raw[..self.raw_len as usize]
    }
}

impl Default for RawMessage {
    fn default() -> Self {
        Self {
            raw: [0u8; MAX_FRAME_BYTES],
            raw_len: 0,
            receive_ts_ms: 0,
        }
    }
}

impl std::fmt::Debug for RawMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawMessage")
            .field("raw", &String::from_utf8_lossy(self.bytes()))
            .field("receive_ts_ms", &self.receive_ts_ms)
            .finish()
    }
}

/// A parsed trade resident in a sliding window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Trade {
    /// Exchange-provided trade timestamp (milliseconds)
    pub trade_ts_ms: i64,
    pub price: f64,
    pub size: f64,
}

/// One minute's VWAP snapshot in a symbol's history ring
#[derive(Debug, Clone, Copy, Default)]
pub struct VwapPoint {
    /// Minute timestamp, a multiple of 60 000 ms
    pub minute_ts_ms: i64,
    /// VWAP over the trailing window ending at this minute; NaN if empty
    pub vwap: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_message_round_trip() {
        let msg = RawMessage::from_frame(b"{\"data\":[]}", 1234);
        assert_eq!(msg.bytes(), b"{\"data\":[]}");
        assert_eq!(msg.receive_ts_ms, 1234);
    }

    #[test]
    fn test_raw_message_truncates_long_frames() {
        let frame = vec![b'x'; MAX_FRAME_BYTES + 100];
        let msg = RawMessage::from_frame(&frame, 0);
        assert_eq!(msg.bytes().len(), MAX_FRAME_BYTES);
    }

    #[test]
    fn test_raw_message_is_copy() {
        let a = RawMessage::from_frame(b"abc", 1);
        let b = a;
        let c = a;
        assert_eq!(b.bytes(), c.bytes());
    }

    #[test]
    fn test_empty_frame() {
        let msg = RawMessage::default();
        assert!(msg.bytes().is_empty());
    }
}
