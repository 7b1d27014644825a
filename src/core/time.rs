//! Clock helpers
//!
//! Wall-clock milliseconds drive record timestamps and minute stamps;
//! interval measurements and the scheduler's absolute deadlines use a
//! process-local monotonic axis that starts near zero at first use.

use chrono::{Local, TimeZone};
use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use super::MS_PER_MINUTE;

static MONOTONIC_EPOCH: OnceLock<Instant> = OnceLock::new();

/// Current wall-clock time in milliseconds since the Unix epoch
#[inline]
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Monotonic nanoseconds since the process epoch
///
/// Unaffected by wall-clock adjustments; suitable for absolute deadlines
/// and duration measurement.
#[inline]
pub fn now_monotonic_ns() -> i64 {
    MONOTONIC_EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as i64
}

/// Floor a wall-clock millisecond timestamp to its minute boundary
#[inline(always)]
pub const fn minute_floor_ms(ts_ms: i64) -> i64 {
    ts_ms.div_euclid(MS_PER_MINUTE) * MS_PER_MINUTE
}

/// Format a minute timestamp as a local ISO 8601 string, seconds pinned to 00
pub fn format_minute_iso(minute_ts_ms: i64) -> String {
    match Local.timestamp_millis_opt(minute_ts_ms) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%dT%H:%M:00%z").to_string(),
        _ => minute_ts_ms.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minute_floor() {
        assert_eq!(minute_floor_ms(0), 0);
        assert_eq!(minute_floor_ms(59_999), 0);
        assert_eq!(minute_floor_ms(60_000), 60_000);
        assert_eq!(minute_floor_ms(61_234), 60_000);
        assert_eq!(minute_floor_ms(1_700_000_123_456), 1_700_000_100_000);
    }

    #[test]
    fn test_minute_floor_is_multiple() {
        for ts in [1i64, 12_345, 999_999_999, 1_700_000_123_456] {
            assert_eq!(minute_floor_ms(ts) % MS_PER_MINUTE, 0);
        }
    }

    #[test]
    fn test_monotonic_is_nondecreasing() {
        let a = now_monotonic_ns();
        let b = now_monotonic_ns();
        assert!(b >= a);
    }

    #[test]
    fn test_format_minute_iso_shape() {
        let formatted = format_minute_iso(1_700_000_100_000);
        // YYYY-MM-DDTHH:MM:00+ZZZZ
        assert!(formatted.contains('T'));
        assert!(formatted.contains(":00"));
    }
}
