//! Symbol interning for zero-allocation string handling
//!
//! The instrument universe is fixed at compile time: eight OKX spot pairs.
//! A `Symbol` is a small integer index into that table, so the hot path
//! maps `instId` bytes to an index with direct comparisons and no
//! allocation, and every per-symbol container is addressed by index.

use super::N_SYMBOLS;

/// Instrument names in table order. Index == `Symbol::index()`.
pub const SYMBOL_NAMES: [&str; N_SYMBOLS] = [
    "BTC-USDT", "ADA-USDT", "ETH-USDT", "DOGE-USDT",
    "XRP-USDT", "SOL-USDT", "LTC-USDT", "BNB-USDT",
];

/// Monitored instrument (interned)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Symbol(u8);

impl Symbol {
    pub const BTC_USDT: Self = Self(0);
    pub const ADA_USDT: Self = Self(1);
    pub const ETH_USDT: Self = Self(2);
    pub const DOGE_USDT: Self = Self(3);
    pub const XRP_USDT: Self = Self(4);
    pub const SOL_USDT: Self = Self(5);
    pub const LTC_USDT: Self = Self(6);
    pub const BNB_USDT: Self = Self(7);

    /// All monitored instruments in table order.
    pub const ALL: [Self; N_SYMBOLS] = [
        Self(0), Self(1), Self(2), Self(3),
        Self(4), Self(5), Self(6), Self(7),
    ];

    /// Parse an `instId` byte slice (hot path, lock-free)
    ///
    /// Returns `None` for instruments outside the monitored set.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            b"BTC-USDT" => Some(Self::BTC_USDT),
            b"ADA-USDT" => Some(Self::ADA_USDT),
            b"ETH-USDT" => Some(Self::ETH_USDT),
            b"DOGE-USDT" => Some(Self::DOGE_USDT),
            b"XRP-USDT" => Some(Self::XRP_USDT),
            b"SOL-USDT" => Some(Self::SOL_USDT),
            b"LTC-USDT" => Some(Self::LTC_USDT),
            b"BNB-USDT" => Some(Self::BNB_USDT),
            _ => None,
        }
    }

    /// Instrument name as sent on the wire
    #[inline]
    pub fn as_str(&self) -> &'static str {
        SYMBOL_NAMES[self.0 as usize]
    }

    /// Index into per-symbol containers, always in `[0, N_SYMBOLS)`
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Build from a container index
    ///
    /// Returns `None` if `index` is out of range.
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        if index < N_SYMBOLS {
            Some(Self(index as u8))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_symbols() {
        assert_eq!(Symbol::from_bytes(b"BTC-USDT"), Some(Symbol::BTC_USDT));
        assert_eq!(Symbol::from_bytes(b"ETH-USDT"), Some(Symbol::ETH_USDT));
        assert_eq!(Symbol::from_bytes(b"BNB-USDT"), Some(Symbol::BNB_USDT));
    }

    #[test]
    fn test_parse_unknown_symbol() {
        assert_eq!(Symbol::from_bytes(b"PEPE-USDT"), None);
        assert_eq!(Symbol::from_bytes(b""), None);
        assert_eq!(Symbol::from_bytes(b"BTC-USD"), None);
    }

    #[test]
    fn test_as_str_round_trip() {
        for symbol in Symbol::ALL {
            assert_eq!(Symbol::from_bytes(symbol.as_str().as_bytes()), Some(symbol));
        }
    }

    #[test]
    fn test_index_is_table_order() {
        for (i, symbol) in Symbol::ALL.iter().enumerate() {
            assert_eq!(symbol.index(), i);
            assert_eq!(Symbol::from_index(i), Some(*symbol));
        }
        assert_eq!(Symbol::from_index(N_SYMBOLS), None);
    }

    #[test]
    fn test_symbol_as_hashmap_key() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(Symbol::BTC_USDT, 100.0);
        map.insert(Symbol::ETH_USDT, 200.0);

        assert_eq!(map.get(&Symbol::BTC_USDT), Some(&100.0));
    }
}
