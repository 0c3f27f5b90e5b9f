//! Completion estimation: partial cycles at the window boundaries
//!
//! A production cycle straddling the start or end of the observation
//! window shows up as leftover events the pairer could not close. This
//! module converts those leftovers into fractional item counts by scaling
//! against a representative cycle duration, and supplies the fallback
//! item estimate for windows with too few complete cycles to define one.

use chrono::{DateTime, Utc};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::types::{sample_interval_secs, secs_between, window_span_secs, Cycle, Sample};

/// Which duration baseline normalizes partial-cycle fractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionPolicy {
    /// Mean up-to-down duration over all paired cycles; defined from one
    /// cycle up
    SingleCycle,
    /// Up-crossing interval between adjacent cycle pairs; defined from
    /// two cycles up
    TwoCycle,
}

impl CompletionPolicy {
    /// Minimum paired cycles needed before the policy's baseline exists.
    fn min_cycles(self) -> usize {
        match self {
            CompletionPolicy::SingleCycle => 1,
            CompletionPolicy::TwoCycle => 2,
        }
    }
}

/// Fractional head/tail contributions and the resulting item total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionEstimate {
    /// Unfinished-cycle fraction at the window start, in [0, 1]
    pub head_fraction: f64,
    /// Unfinished-cycle fraction at the window end, in [0, 1]
    pub tail_fraction: f64,
    /// Full cycles plus fractions, or the fallback estimate when the
    /// baseline is undefined
    pub total_items: f64,
}

/// Mean single-cycle (up to down) duration in seconds.
fn mean_cycle_duration_secs(cycles: &[Cycle]) -> f64 {
    if cycles.is_empty() {
        return 0.0;
    }
    cycles.iter().map(Cycle::duration_secs).mean()
}

/// Estimate partial-cycle fractions and the window's item total.
///
/// With enough paired cycles for the policy's baseline, the total is the
/// full cycle count plus head and tail fractions. With fewer, the total
/// falls back to time-above-threshold divided by whatever baseline is
/// available (mean cycle duration if at least one cycle paired, else the
/// window span), clipped to the policy's range.
pub fn estimate_completion(
    series: &[Sample],
    conditioned: &[f64],
    threshold: f64,
    cycles: &[Cycle],
    up_times: &[DateTime<Utc>],
    down_times: &[DateTime<Utc>],
    peak_count: usize,
    policy: CompletionPolicy,
) -> CompletionEstimate {
    if cycles.len() >= policy.min_cycles() {
        let (head_base, tail_base) = baselines(cycles, policy);
        let head_fraction = head_fraction(series, conditioned, threshold, down_times, head_base);
        let tail_fraction = tail_fraction(series, conditioned, threshold, up_times, tail_base);
        return CompletionEstimate {
            head_fraction,
            tail_fraction,
            total_items: cycles.len() as f64 + head_fraction + tail_fraction,
        };
    }

    // Too few cycles for the policy's baseline: fall back to the
    // duty-cycle estimate
    let total_items = fallback_items(series, conditioned, threshold, cycles, peak_count, policy);
    debug!(
        policy = ?policy,
        paired = cycles.len(),
        total_items,
        "Completion fallback engaged"
    );
    CompletionEstimate { head_fraction: 0.0, tail_fraction: 0.0, total_items }
}

/// Head and tail baseline durations in seconds for the given policy.
fn baselines(cycles: &[Cycle], policy: CompletionPolicy) -> (f64, f64) {
    match policy {
        CompletionPolicy::SingleCycle => {
            let t1 = mean_cycle_duration_secs(cycles);
            (t1, t1)
        }
        CompletionPolicy::TwoCycle => {
            let n = cycles.len();
            let head = secs_between(cycles[0].up, cycles[1].up);
            let tail = secs_between(cycles[n - 2].up, cycles[n - 1].up);
            (head, tail)
        }
    }
}

/// Fraction of an unfinished cycle already underway at the window start.
///
/// Requires the conditioned signal to be active at the first sample and at
/// least one down-crossing: the stretch from window start to the first
/// down-crossing is the visible remainder of a cycle begun before the
/// window.
fn head_fraction(
    series: &[Sample],
    conditioned: &[f64],
    threshold: f64,
    down_times: &[DateTime<Utc>],
    baseline_secs: f64,
) -> f64 {
    let (Some(first_sample), Some(&first_down)) = (series.first(), down_times.first()) else {
        return 0.0;
    };
    let active_at_start = conditioned.first().is_some_and(|&v| v >= threshold);
    if !active_at_start || baseline_secs <= 0.0 {
        return 0.0;
    }
    (secs_between(first_sample.timestamp, first_down) / baseline_secs).min(1.0)
}

/// Fraction of an unfinished cycle still underway at the window end.
fn tail_fraction(
    series: &[Sample],
    conditioned: &[f64],
    threshold: f64,
    up_times: &[DateTime<Utc>],
    baseline_secs: f64,
) -> f64 {
    let (Some(last_sample), Some(&last_up)) = (series.last(), up_times.last()) else {
        return 0.0;
    };
    let active_at_end = conditioned.last().is_some_and(|&v| v >= threshold);
    if !active_at_end || baseline_secs <= 0.0 {
        return 0.0;
    }
    (secs_between(last_up, last_sample.timestamp) / baseline_secs).min(1.0)
}

/// Duty-cycle fallback: time at/above threshold over the best available
/// baseline, clipped per policy.
fn fallback_items(
    series: &[Sample],
    conditioned: &[f64],
    threshold: f64,
    cycles: &[Cycle],
    peak_count: usize,
    policy: CompletionPolicy,
) -> f64 {
    let dt = sample_interval_secs(series);
    let active_secs = conditioned.iter().filter(|&&v| v >= threshold).count() as f64 * dt;

    let baseline_secs = if cycles.is_empty() {
        window_span_secs(series)
    } else {
        mean_cycle_duration_secs(cycles)
    };
    if baseline_secs <= 0.0 {
        return 0.0;
    }

    let raw = active_secs / baseline_secs;
    match policy {
        CompletionPolicy::SingleCycle => {
            if peak_count >= 1 {
                raw.clamp(0.5, 1.0)
            } else {
                0.0
            }
        }
        CompletionPolicy::TwoCycle => raw.clamp(0.0, 1.0),
    }
}
