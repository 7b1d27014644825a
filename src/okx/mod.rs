//! OKX exchange specifics
//!
//! Frame parsing for the public trades channel and the subscription
//! payload covering the monitored instrument set.

pub mod parsing;

pub use parsing::{parse_trade_frame, ParseError, ParsedTrade};

use crate::core::Symbol;

/// Build the one-shot subscribe frame for the trades channel
///
/// Enumerates every monitored instrument in table order.
pub fn subscribe_payload() -> String {
    let args: Vec<serde_json::Value> = Symbol::ALL
        .iter()
        .map(|symbol| serde_json::json!({ "channel": "trades", "instId": symbol.as_str() }))
        .collect();
    serde_json::json!({ "op": "subscribe", "args": args }).to_string()
}
