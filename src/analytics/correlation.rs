//! Lagged cross-instrument correlation
//!
//! For each source symbol the worker takes its last `MOVING_AVG_POINTS`
//! per-minute VWAPs and, for every target symbol, slides that vector back
//! through the target's history up to `MAX_LAG_MINUTES`, keeping the
//! offset with the greatest |r|. The overall best target (non-NaN only)
//! is emitted once per tick. The target vector lives in a stack buffer;
//! the search allocates nothing.

use crate::core::{Symbol, VwapPoint, MAX_LAG_MINUTES, MOVING_AVG_POINTS};
use crate::data::VwapHistory;
use crate::engine::Engine;

/// Pearson correlation coefficient between two equal-length series
///
/// Returns NaN when either series has zero variance (or NaN members, which
/// poison the sums).
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len() as f64;

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_yy = 0.0;
    let mut sum_xy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        sum_x += xi;
        sum_y += yi;
        sum_xx += xi * xi;
        sum_yy += yi * yi;
        sum_xy += xi * yi;
    }

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_xx - sum_x * sum_x) * (n * sum_yy - sum_y * sum_y)).sqrt();
    if denominator == 0.0 {
        return f64::NAN;
    }
    numerator / denominator
}

/// Best lagged window found in one target history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagMatch {
    pub r: f64,
    /// Minute stamp of the matched window's newest point
    pub end_minute_ts_ms: i64,
}

/// Search one target history for the lagged window best correlated with
/// `src`
///
/// `min_offset` is 0 for peers and `MOVING_AVG_POINTS` for the source's
/// own history (first non-overlapping window). The whole scan runs under
/// the target's lock so a concurrent append cannot tear a candidate.
/// Ties keep the earliest offset; NaN candidates are skipped.
pub fn best_lagged_match(
    src: &[f64; MOVING_AVG_POINTS],
    target: &VwapHistory,
    min_offset: usize,
) -> Option<LagMatch> {
    target.with_view(|view| {
        let len = view.len();
        if len < MOVING_AVG_POINTS + min_offset {
            return None;
        }
        let max_offset = MAX_LAG_MINUTES.min(len - MOVING_AVG_POINTS);

        let mut best: Option<LagMatch> = None;
        let mut target_vec = [0.0f64; MOVING_AVG_POINTS];
        for offset in min_offset..=max_offset {
            let start = len - MOVING_AVG_POINTS - offset;
            for (k, slot) in target_vec.iter_mut().enumerate() {
                *slot = view.point(start + k).vwap;
            }

            let r = pearson(src, &target_vec);
            if r.is_nan() {
                continue;
            }
            let better = match best {
                None => true,
                Some(prev) => r.abs() > prev.r.abs(),
            };
            if better {
                best = Some(LagMatch {
                    r,
                    end_minute_ts_ms: view.point(start + MOVING_AVG_POINTS - 1).minute_ts_ms,
                });
            }
        }
        best
    })
}

/// One tick of correlation searches across all symbols
pub fn run_tick(engine: &Engine, minute_ms: i64) {
    let mut recent = [VwapPoint::default(); MOVING_AVG_POINTS];
    let mut src = [0.0f64; MOVING_AVG_POINTS];

    for source in &engine.symbols {
        if !source.history.get_recent(&mut recent) {
            continue; // not enough data yet
        }
        for (slot, point) in src.iter_mut().zip(&recent) {
            *slot = point.vwap;
        }

        let mut best: Option<(Symbol, LagMatch)> = None;
        for target in &engine.symbols {
            let min_offset = if target.symbol == source.symbol {
                MOVING_AVG_POINTS
            } else {
                0
            };
            if let Some(found) = best_lagged_match(&src, &target.history, min_offset) {
                let better = match best {
                    None => true,
                    Some((_, prev)) => found.r.abs() > prev.r.abs(),
                };
                if better {
                    best = Some((target.symbol, found));
                }
            }
        }

        if let Some((peer, found)) = best {
            engine.sinks.log_correlation(
                source.symbol,
                minute_ms,
                peer,
                found.r,
                found.end_minute_ts_ms,
            );
        }
    }
}

/// Worker thread body: runs the correlation phase of every tick
pub fn correlation_worker(engine: &Engine) {
    loop {
        engine.start_barrier.wait();
        let quitting = engine.is_tick_final();
        // The phase barrier orders every VWAP append before our reads.
        engine.phase_barrier.wait();
        if !quitting {
            run_tick(engine, engine.tick_minute());
        }
        engine.done_barrier.wait();
        if quitting {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HISTORY_CAPACITY;

    fn history_with(values: &[f64]) -> VwapHistory {
        let history = VwapHistory::new(HISTORY_CAPACITY);
        for (i, &v) in values.iter().enumerate() {
            history.append(i as i64 * 60_000, v);
        }
        history
    }

    #[test]
    fn test_pearson_perfect_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);

        let inverse = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &inverse) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_symmetry() {
        let x = [1.0, 5.0, 2.0, 8.0, 3.0];
        let y = [2.0, 1.0, 7.0, 4.0, 6.0];
        assert!((pearson(&x, &y) - pearson(&y, &x)).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_affine_invariance() {
        let x = [1.0, 5.0, 2.0, 8.0, 3.0];
        let y = [2.0, 1.0, 7.0, 4.0, 6.0];
        let r = pearson(&x, &y);

        // r(a·x + b, y) == sign(a) · r(x, y)
        let scaled: Vec<f64> = x.iter().map(|v| 3.0 * v + 10.0).collect();
        assert!((pearson(&scaled, &y) - r).abs() < 1e-9);

        let negated: Vec<f64> = x.iter().map(|v| -2.0 * v + 1.0).collect();
        assert!((pearson(&negated, &y) + r).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_zero_variance_is_nan() {
        let flat = [4.0, 4.0, 4.0, 4.0];
        let y = [1.0, 2.0, 3.0, 4.0];
        assert!(pearson(&flat, &y).is_nan());
        assert!(pearson(&y, &flat).is_nan());
    }

    #[test]
    fn test_self_lag_ramp() {
        // History [1..16]; source vector is [9..16]. Own-history search
        // starts at the first non-overlapping window, [1..8] at offset 8,
        // a perfect linear match.
        let values: Vec<f64> = (1..=16).map(|v| v as f64).collect();
        let history = history_with(&values);

        let src: [f64; MOVING_AVG_POINTS] =
            std::array::from_fn(|i| values[values.len() - MOVING_AVG_POINTS + i]);
        let found = best_lagged_match(&src, &history, MOVING_AVG_POINTS).unwrap();

        assert!((found.r - 1.0).abs() < 1e-12);
        // Window [1..8] ends at the 8th point, minute index 7.
        assert_eq!(found.end_minute_ts_ms, 7 * 60_000);
    }

    #[test]
    fn test_insufficient_history_yields_no_match() {
        let values: Vec<f64> = (1..=MOVING_AVG_POINTS as i64).map(|v| v as f64).collect();
        let history = history_with(&values);
        let src = [0.0; MOVING_AVG_POINTS];

        // Peer search needs MOVING_AVG_POINTS points: exactly enough.
        assert!(best_lagged_match(&src, &history_with(&values[..MOVING_AVG_POINTS - 1]), 0).is_none());
        // Own-history search needs twice that.
        assert!(best_lagged_match(&src, &history, MOVING_AVG_POINTS).is_none());
    }

    #[test]
    fn test_zero_lag_peer_match() {
        let values: Vec<f64> = (0..MOVING_AVG_POINTS as i64).map(|v| (v * v) as f64).collect();
        let history = history_with(&values);
        let src: [f64; MOVING_AVG_POINTS] = std::array::from_fn(|i| values[i]);

        let found = best_lagged_match(&src, &history, 0).unwrap();
        assert!((found.r - 1.0).abs() < 1e-12);
        assert_eq!(
            found.end_minute_ts_ms,
            (MOVING_AVG_POINTS as i64 - 1) * 60_000
        );
    }

    #[test]
    fn test_flat_target_treated_as_absent() {
        let flat = vec![5.0; MOVING_AVG_POINTS + 4];
        let history = history_with(&flat);
        let src: [f64; MOVING_AVG_POINTS] = std::array::from_fn(|i| i as f64);

        assert!(best_lagged_match(&src, &history, 0).is_none());
    }

    #[test]
    fn test_nan_point_invalidates_only_overlapping_windows() {
        // A NaN early in the history poisons windows that include it, but
        // the newest windows are clean and still match.
        let mut values: Vec<f64> = (1..=20).map(|v| v as f64).collect();
        values[0] = f64::NAN;
        let history = history_with(&values);
        let src: [f64; MOVING_AVG_POINTS] =
            std::array::from_fn(|i| values[values.len() - MOVING_AVG_POINTS + i]);

        let found = best_lagged_match(&src, &history, 0).unwrap();
        assert!((found.r - 1.0).abs() < 1e-12);
        // The matched window cannot be one that includes index 0.
        assert!(found.end_minute_ts_ms >= (MOVING_AVG_POINTS as i64 - 1) * 60_000);
    }

    #[test]
    fn test_tie_keeps_earliest_offset() {
        // Identical windows at several offsets: first found wins.
        let period: Vec<f64> = (0..24).map(|v| ((v % 8) + 1) as f64).collect();
        let history = history_with(&period);
        let src: [f64; MOVING_AVG_POINTS] = std::array::from_fn(|i| (i + 1) as f64);

        let found = best_lagged_match(&src, &history, 0).unwrap();
        assert!((found.r - 1.0).abs() < 1e-12);
        // Offset 0 window ends at the newest point.
        assert_eq!(found.end_minute_ts_ms, 23 * 60_000);
    }

    #[test]
    fn test_run_tick_picks_best_peer() {
        use crate::engine::test_engine;

        let (engine, dir) = test_engine("corr_tick");

        // Symbol 0: ramp. Symbol 1: same ramp scaled (r = 1 at offset 0).
        // Symbol 2: noise-free but uncorrelated shape.
        for i in 0..MOVING_AVG_POINTS as i64 {
            let minute = i * 60_000;
            engine.symbols[0].history.append(minute, i as f64);
            engine.symbols[1].history.append(minute, 10.0 + 2.0 * i as f64);
            engine.symbols[2]
                .history
                .append(minute, if i % 2 == 0 { 1.0 } else { -1.0 });
        }

        run_tick(&engine, MOVING_AVG_POINTS as i64 * 60_000);

        let corr_file = dir
            .join("metrics/correlations")
            .join(format!("{}.csv", engine.symbols[0].symbol.as_str()));
        let contents = std::fs::read_to_string(corr_file).unwrap();
        // Best match for the ramp is the scaled ramp on symbol 1.
        assert!(contents.contains(",ADA-USDT,1.000000,"));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_run_tick_emits_nothing_without_history() {
        use crate::engine::test_engine;

        let (engine, dir) = test_engine("corr_empty");
        run_tick(&engine, 60_000);

        for state in &engine.symbols {
            let corr_file = dir
                .join("metrics/correlations")
                .join(format!("{}.csv", state.symbol.as_str()));
            assert_eq!(std::fs::read_to_string(corr_file).unwrap(), "");
        }

        std::fs::remove_dir_all(dir).ok();
    }
}
