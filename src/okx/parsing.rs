//! Byte-level parser for OKX trade frames
//!
//! Extracts `instId`, `px`, `sz` and `ts` from the first object of the
//! frame's `data` array without building a DOM. Subscribe acks, pong
//! replies and channel events have no `data` array and are reported as
//! `NotATrade` so the processor can skip them silently.
//!
//! OKX public trade message format (example):
//! ```text
//! {
//!   "arg": { "channel": "trades", "instType": "SPOT", "instId": "BTC-USDT" },
//!   "data": [
//!     { "instId": "BTC-USDT", "px": "27340.8", "sz": "0.0005",
//!       "side": "sell", "ts": "1694464949239" }
//!   ]
//! }
//! ```

use crate::core::Symbol;
use thiserror::Error;

/// A successfully parsed trade frame
///
/// `ts_ms` is `None` when the exchange timestamp is missing or malformed;
/// the processor substitutes the local wall clock in that case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedTrade {
    pub symbol: Symbol,
    pub ts_ms: Option<i64>,
    pub price: f64,
    pub size: f64,
}

/// Why a frame did not yield a trade
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// No `data` array: acks, pongs, channel events. Skipped silently.
    #[error("frame carries no data array")]
    NotATrade,
    #[error("unknown instrument '{0}'")]
    UnknownInstrument(String),
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("invalid price '{0}'")]
    InvalidPrice(String),
    #[error("invalid size '{0}'")]
    InvalidSize(String),
}

/// Parse one trade frame into its numeric fields
pub fn parse_trade_frame(frame: &[u8]) -> Result<ParsedTrade, ParseError> {
    // Locate the first object of the data array; everything before it
    // (the arg envelope) also carries an instId and must be skipped.
    let trade_obj = data_array_object(frame).ok_or(ParseError::NotATrade)?;

    let inst_id = find_field(trade_obj, b"instId").ok_or(ParseError::MissingField("instId"))?;
    let symbol = Symbol::from_bytes(inst_id)
        .ok_or_else(|| ParseError::UnknownInstrument(String::from_utf8_lossy(inst_id).into_owned()))?;

    let px = find_field(trade_obj, b"px").ok_or(ParseError::MissingField("px"))?;
    let price = parse_f64(px)
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| ParseError::InvalidPrice(String::from_utf8_lossy(px).into_owned()))?;

    let sz = find_field(trade_obj, b"sz").ok_or(ParseError::MissingField("sz"))?;
    let size = parse_f64(sz)
        .filter(|s| s.is_finite() && *s > 0.0)
        .ok_or_else(|| ParseError::InvalidSize(String::from_utf8_lossy(sz).into_owned()))?;

    // Timestamp is best-effort: a missing or malformed ts is not fatal.
    let ts_ms = find_field(trade_obj, b"ts")
        .and_then(parse_i64)
        .filter(|ts| *ts > 0);

    Ok(ParsedTrade {
        symbol,
        ts_ms,
        price,
        size,
    })
}

/// Slice the frame from the first object inside its `data` array
fn data_array_object(frame: &[u8]) -> Option<&[u8]> {
    let key_pos = find_subslice(frame, b"\"data\"")?;
    let rest = &frame[key_pos + 6..];
    let bracket = rest.iter().position(|&b| b == b'[')?;
    let after_bracket = &rest[bracket + 1..];
    let brace = after_bracket.iter().position(|&b| b == b'{')?;
    Some(&after_bracket[brace..])
}

#[inline]
fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Fast byte-level JSON field finder
///
/// Returns the field's value bytes: quotes stripped for strings, raw
/// digits for bare numbers and booleans.
#[inline]
pub fn find_field<'a>(data: &'a [u8], field: &[u8]) -> Option<&'a [u8]> {
    let field_len = field.len();
    let data_len = data.len();

    if field_len == 0 || data_len < field_len + 3 {
        return None;
    }

    let mut i = 0;
    while i <= data_len - field_len - 2 {
        // Look for the quoted field name
        if data[i] == b'"' {
            let end = i + 1 + field_len;
            if end < data_len && &data[i + 1..end] == field && data[end] == b'"' {
                // Found field name, look for the value after the colon
                let mut j = end + 1;
                while j < data_len && (data[j] == b':' || data[j].is_ascii_whitespace()) {
                    j += 1;
                }

                if j >= data_len {
                    return None;
                }

                if data[j] == b'"' {
                    // String value
                    let start = j + 1;
                    let mut k = start;
                    while k < data_len && data[k] != b'"' {
                        k += 1;
                    }
                    return Some(&data[start..k]);
                } else {
                    // Number or boolean - stop at delimiter or whitespace
                    let start = j;
                    let mut k = start;
                    while k < data_len
                        && !matches!(data[k], b',' | b'}' | b']' | b' ' | b'\t' | b'\n' | b'\r')
                    {
                        k += 1;
                    }
                    return Some(&data[start..k]);
                }
            }
        }
        i += 1;
    }

    None
}

/// Parse a decimal from bytes
#[inline]
pub fn parse_f64(bytes: &[u8]) -> Option<f64> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

/// Parse a signed integer from bytes
#[inline]
pub fn parse_i64(bytes: &[u8]) -> Option<i64> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}
