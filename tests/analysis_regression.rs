//! Analysis Regression Tests
//!
//! Exercises the full pipeline on synthesized pulse trains with
//! hand-computed expectations: cycle counts, partial-cycle math, the
//! rate rules of every strategy, and the energy/demand conversions.
//!
//! The canonical fixture is a 900-second window sampled every 10 s with
//! two clean pulses: values 8, 10, 8, 6 starting at t=90 and t=390, zero
//! elsewhere. Against a threshold of 5 that gives up-crossings at t=80
//! and t=380, peaks at t=100 and t=400, and down-crossings at t=120 and
//! t=420. Smoothing is disabled so the hand math stays exact.

use approx::assert_relative_eq;
use chrono::{DateTime, TimeZone, Utc};
use cyclemetry::{analyze, AnalysisConfig, AnalysisResult, RateStrategy, Sample};

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_750_000_000 + secs, 0).unwrap()
}

/// Series sampled every 10 s from the given values, starting at t=0.
fn series(values: &[f64]) -> Vec<Sample> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| Sample::new(ts(i as i64 * 10), v))
        .collect()
}

/// The two-pulse fixture, truncated to `last_t` seconds inclusive.
fn two_pulse_series(last_t: i64) -> Vec<Sample> {
    let n = (last_t / 10 + 1) as usize;
    let mut values = vec![0.0; n];
    for (offset, v) in [(9, 8.0), (10, 10.0), (11, 8.0), (12, 6.0)] {
        for start in [0usize, 30] {
            if start + offset < n {
                values[start + offset] = v;
            }
        }
    }
    series(&values)
}

fn unsmoothed(strategy: RateStrategy) -> AnalysisConfig {
    let mut config = AnalysisConfig::with_threshold(5.0).with_strategy(strategy);
    config.smooth_window = 0;
    config
}

// ============================================================================
// Full 900 s window: both pulses complete
// ============================================================================

#[test]
fn full_window_counts_two_cycles() {
    let primary = two_pulse_series(900);
    let result = analyze(&primary, None, &unsmoothed(RateStrategy::LastPeaksInterval));

    assert_eq!(result.full_cycles, 2);
    assert_eq!(result.cycles[0].up, ts(80));
    assert_eq!(result.cycles[0].peak, ts(100));
    assert_eq!(result.cycles[0].down, ts(120));
    assert_eq!(result.cycles[1].up, ts(380));
    assert_eq!(result.cycles[1].peak, ts(400));
    assert_eq!(result.cycles[1].down, ts(420));

    // Signal idle at both edges: no partial cycles
    assert_eq!(result.head_fraction, 0.0);
    assert_eq!(result.tail_fraction, 0.0);
    assert_relative_eq!(result.total_items, 2.0);
}

#[test]
fn full_window_last_peaks_rates() {
    let primary = two_pulse_series(900);
    let result = analyze(&primary, None, &unsmoothed(RateStrategy::LastPeaksInterval));

    // A = 300 s between the peaks; B = 500 s from the last peak to the
    // window end exceeds the 420 s stall cutoff
    assert_relative_eq!(result.rate_items_per_15min, 3.0);
    assert_eq!(result.current_rate_items_per_15min, 0.0);
}

#[test]
fn full_window_energy_and_demand() {
    let primary = two_pulse_series(900);
    let result = analyze(&primary, None, &unsmoothed(RateStrategy::LastPeaksInterval));

    // Each pulse integrates to (4 + 9 + 9 + 7 + 3) MW over 10 s legs
    let pulse_mwh = 32.0 * 10.0 / 3600.0;
    let total_kwh = 2.0 * pulse_mwh * 1000.0;
    assert_relative_eq!(result.total_energy_kwh, total_kwh, max_relative = 1e-12);
    assert_relative_eq!(result.demand_mw, 2.0 * pulse_mwh * 4.0, max_relative = 1e-12);

    // Per-item energy over 2.0 items
    assert_relative_eq!(
        result.energy_per_item_kwh.unwrap(),
        total_kwh / 2.0,
        max_relative = 1e-12
    );

    // LastPeaksInterval: per-item demand from the energy between the two
    // peak timestamps (one pulse tail + one pulse head = 32 MW·10 s)
    assert_relative_eq!(
        result.demand_per_item_mw.unwrap(),
        pulse_mwh * 4.0,
        max_relative = 1e-12
    );
}

#[test]
fn baseline_strategies_on_full_window() {
    let primary = two_pulse_series(900);

    // T1: gap between the cycles' peak times is 300 s
    let t1 = analyze(&primary, None, &unsmoothed(RateStrategy::SingleCycleBaseline));
    assert_relative_eq!(t1.rate_items_per_15min, 3.0);
    assert_relative_eq!(t1.current_rate_items_per_15min, 3.0);

    // T2: up-crossing interval between the cycles is 300 s
    let t2 = analyze(&primary, None, &unsmoothed(RateStrategy::TwoCycleBaseline));
    assert_relative_eq!(t2.rate_items_per_15min, 3.0);
    assert_relative_eq!(t2.total_items, 2.0);

    // Baseline strategies derive per-item demand from total energy
    let pulse_mwh = 32.0 * 10.0 / 3600.0;
    let per_item_kwh = 2.0 * pulse_mwh * 1000.0 / 2.0;
    assert_relative_eq!(
        t1.demand_per_item_mw.unwrap(),
        per_item_kwh * 4.0 / 1000.0,
        max_relative = 1e-12
    );
}

// ============================================================================
// Truncated window at t=410: second pulse still open
// ============================================================================

#[test]
fn truncated_window_pairs_one_cycle() {
    let primary = two_pulse_series(410);
    let result = analyze(&primary, None, &unsmoothed(RateStrategy::SingleCycleBaseline));

    // The second pulse has an up-crossing and a peak but no down-crossing
    // before the window ends, so only one triple nests
    assert_eq!(result.full_cycles, 1);

    // Tail: signal active at the window's last sample, last up-crossing
    // at t=380, baseline = the one cycle's 40 s duration:
    // (410 - 380) / 40 = 0.75
    assert_eq!(result.head_fraction, 0.0);
    assert_relative_eq!(result.tail_fraction, 0.75);
    assert_relative_eq!(result.total_items, 1.75);

    // Fewer than two cycles: the strategy reports total_items as rate
    assert_relative_eq!(result.rate_items_per_15min, 1.75);
}

#[test]
fn truncated_window_two_cycle_fallback_math() {
    let primary = two_pulse_series(410);
    let result = analyze(&primary, None, &unsmoothed(RateStrategy::TwoCycleBaseline));

    // One cycle is not enough for the two-cycle baseline, so the total
    // falls back to time-above-threshold over the single-cycle duration:
    // 7 samples at/above 5 × 10 s = 70 s active, 70 / 40 = 1.75,
    // clipped to the [0.0, 1.0] range
    assert_eq!(result.full_cycles, 1);
    assert_eq!(result.head_fraction, 0.0);
    assert_eq!(result.tail_fraction, 0.0);
    assert_relative_eq!(result.total_items, 1.0);
    assert_relative_eq!(result.rate_items_per_15min, 1.0);
}

#[test]
fn truncated_window_last_peaks_keeps_backward_rate() {
    let primary = two_pulse_series(410);
    let result = analyze(&primary, None, &unsmoothed(RateStrategy::LastPeaksInterval));

    // B = 10 s since the last peak <= A = 300 s
    assert_relative_eq!(result.rate_items_per_15min, 3.0);
    assert_relative_eq!(result.current_rate_items_per_15min, 3.0);
    assert_relative_eq!(result.total_items, 1.75);
}

// ============================================================================
// Window starting mid-pulse: head fraction
// ============================================================================

#[test]
fn head_fraction_from_pulse_straddling_window_start() {
    // Active at t=0, down-crossing at t=10, then one clean cycle of
    // 30 s (up t=30, peak t=50, down t=60)
    let primary = series(&[8.0, 6.0, 0.0, 0.0, 8.0, 10.0, 8.0, 0.0, 0.0, 0.0]);
    let result = analyze(&primary, None, &unsmoothed(RateStrategy::SingleCycleBaseline));

    assert_eq!(result.full_cycles, 1);
    // (10 - 0) / 30 s cycle duration
    assert_relative_eq!(result.head_fraction, 1.0 / 3.0);
    assert_eq!(result.tail_fraction, 0.0);
    assert_relative_eq!(result.total_items, 1.0 + 1.0 / 3.0);
}

#[test]
fn head_fraction_clips_to_one() {
    // 60 s of activity before the first down-crossing, against a 30 s
    // cycle duration later in the window
    let primary = series(&[
        8.0, 8.0, 8.0, 8.0, 8.0, 8.0, 0.0, 8.0, 10.0, 8.0, 0.0, 0.0,
    ]);
    let result = analyze(&primary, None, &unsmoothed(RateStrategy::SingleCycleBaseline));

    assert_eq!(result.full_cycles, 1);
    assert_eq!(result.head_fraction, 1.0);
    assert_relative_eq!(result.total_items, 2.0);
}

// ============================================================================
// Degenerate and boundary windows
// ============================================================================

#[test]
fn all_below_threshold_is_all_zero() {
    let primary = series(&[1.0, 2.0, 3.0, 2.0, 1.0, 2.0]);
    for strategy in [
        RateStrategy::LastPeaksInterval,
        RateStrategy::SingleCycleBaseline,
        RateStrategy::TwoCycleBaseline,
    ] {
        let result = analyze(&primary, None, &unsmoothed(strategy));
        assert_eq!(result.full_cycles, 0, "{strategy}");
        assert_eq!(result.total_items, 0.0, "{strategy}");
        assert_eq!(result.rate_items_per_15min, 0.0, "{strategy}");
        assert_eq!(result.current_rate_items_per_15min, 0.0, "{strategy}");
        assert_eq!(result.energy_per_item_kwh, None, "{strategy}");
        assert_eq!(result.demand_per_item_mw, None, "{strategy}");
    }
}

#[test]
fn empty_window_is_empty_result() {
    let config = unsmoothed(RateStrategy::LastPeaksInterval);
    assert_eq!(analyze(&[], None, &config), AnalysisResult::empty());
}

#[test]
fn single_orphan_peak_falls_back_to_half_item() {
    // A one-sample spike: its peak and down-crossing coincide, so no
    // cycle pairs; the single-cycle fallback clamps the duty estimate
    // (10 s active / 60 s window) up to 0.5
    let primary = series(&[0.0, 0.0, 0.0, 9.0, 0.0, 0.0, 0.0]);
    let result = analyze(&primary, None, &unsmoothed(RateStrategy::SingleCycleBaseline));

    assert_eq!(result.full_cycles, 0);
    assert_relative_eq!(result.total_items, 0.5);
    assert_relative_eq!(result.rate_items_per_15min, 0.5);
}

#[test]
fn smoothing_suppresses_one_sample_noise() {
    // The same spike under the default 3-sample smoothing flattens to
    // 3 MW and never crosses the threshold
    let primary = series(&[0.0, 0.0, 0.0, 9.0, 0.0, 0.0, 0.0]);
    let config = AnalysisConfig::with_threshold(5.0);
    let result = analyze(&primary, None, &config);

    assert_eq!(result.full_cycles, 0);
    assert_eq!(result.total_items, 0.0);
}

// ============================================================================
// Contract properties
// ============================================================================

#[test]
fn analysis_is_idempotent() {
    let primary = two_pulse_series(900);
    let config = unsmoothed(RateStrategy::LastPeaksInterval);
    let first = analyze(&primary, None, &config);
    let second = analyze(&primary, None, &config);
    assert_eq!(first, second);
}

#[test]
fn constant_power_energy_round_trip() {
    // 4 MW held for a 900 s window: exactly 1 MWh, 4 MW demand
    let primary = series(&vec![4.0; 91]);
    let result = analyze(&primary, None, &unsmoothed(RateStrategy::LastPeaksInterval));

    assert_relative_eq!(result.total_energy_kwh, 1000.0, max_relative = 1e-12);
    assert_relative_eq!(result.demand_mw, 4.0, max_relative = 1e-12);
}

#[test]
fn cycles_never_share_events() {
    let primary = two_pulse_series(900);
    let result = analyze(&primary, None, &unsmoothed(RateStrategy::LastPeaksInterval));

    let mut seen = std::collections::HashSet::new();
    for c in &result.cycles {
        assert!(c.up < c.peak && c.peak < c.down);
        assert!(seen.insert(c.up));
        assert!(seen.insert(c.peak));
        assert!(seen.insert(c.down));
    }
}

#[test]
fn result_serializes_for_downstream_consumers() {
    let primary = two_pulse_series(900);
    let result = analyze(&primary, None, &unsmoothed(RateStrategy::LastPeaksInterval));

    let json = serde_json::to_string(&result).unwrap();
    let back: AnalysisResult = serde_json::from_str(&json).unwrap();
    assert_eq!(result, back);

    // Absent per-item figures must serialize as null, not 0
    let idle = analyze(&series(&[0.0, 0.0, 0.0]), None, &unsmoothed(RateStrategy::LastPeaksInterval));
    let value: serde_json::Value = serde_json::to_value(&idle).unwrap();
    assert!(value["energy_per_item_kwh"].is_null());
}
