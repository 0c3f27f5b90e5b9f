//! Rate estimation: items per 15-minute period
//!
//! Three interchangeable strategies over the same extracted events. All of
//! them are pure functions of one window; every division is guarded and
//! substitutes 0.0 on a non-positive interval.
//!
//! `LastPeaksInterval` is the live-dashboard rule: the backward-looking
//! rate comes from the gap between the last two peaks, while the current
//! rate widens to the gap since the last peak once that gap exceeds the
//! backward interval, and reads zero outright once the process looks
//! stalled. The two baseline strategies trade responsiveness for
//! stability by leaning on paired cycles instead of raw peaks.

use chrono::{DateTime, Utc};

use crate::types::{secs_between, Cycle, RateStrategy};

/// Seconds per 15-minute period; `900 / interval` converts a per-item
/// interval into items per 15 minutes.
const QUARTER_HOUR_SECS: f64 = 900.0;

/// The two rate figures of one analysis window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateFigures {
    /// Backward-looking rate, items per 15 minutes
    pub rate_items_per_15min: f64,
    /// Current rate, items per 15 minutes
    pub current_rate_items_per_15min: f64,
}

/// Estimate the window's rate figures under the selected strategy.
///
/// `total_items` is the completion estimator's output; the baseline
/// strategies fall back to it when fewer than two full cycles exist.
pub fn estimate_rate(
    strategy: RateStrategy,
    peak_times: &[DateTime<Utc>],
    cycles: &[Cycle],
    window_end: DateTime<Utc>,
    total_items: f64,
    stall_cutoff_secs: f64,
) -> RateFigures {
    match strategy {
        RateStrategy::LastPeaksInterval => {
            last_peaks_rate(peak_times, window_end, stall_cutoff_secs)
        }
        RateStrategy::SingleCycleBaseline => uniform(single_cycle_rate(cycles, total_items)),
        RateStrategy::TwoCycleBaseline => uniform(two_cycle_rate(cycles, total_items)),
    }
}

fn uniform(rate: f64) -> RateFigures {
    RateFigures { rate_items_per_15min: rate, current_rate_items_per_15min: rate }
}

/// Items per 15 minutes from a per-item interval, 0.0 on a non-positive
/// interval.
fn per_interval_rate(interval_secs: f64) -> f64 {
    if interval_secs > 0.0 {
        QUARTER_HOUR_SECS / interval_secs
    } else {
        0.0
    }
}

/// Dual-threshold live rate from the peak list.
///
/// With two or more peaks, A is the gap between the last two and B the
/// gap from the last peak to the window end: the current rate is 900/A
/// while B has not yet exceeded A, zero once B exceeds the stall cutoff,
/// and 900/B in between (the rate the window-end gap itself implies).
fn last_peaks_rate(
    peak_times: &[DateTime<Utc>],
    window_end: DateTime<Utc>,
    stall_cutoff_secs: f64,
) -> RateFigures {
    match peak_times {
        [] => uniform(0.0),
        [only] => {
            let b = secs_between(*only, window_end);
            RateFigures {
                rate_items_per_15min: 0.0,
                current_rate_items_per_15min: per_interval_rate(b),
            }
        }
        [.., second_last, last] => {
            let a = secs_between(*second_last, *last);
            let b = secs_between(*last, window_end);
            let rate = per_interval_rate(a);
            let current = if b <= a {
                rate
            } else if b > stall_cutoff_secs {
                0.0
            } else {
                per_interval_rate(b)
            };
            RateFigures {
                rate_items_per_15min: rate,
                current_rate_items_per_15min: current,
            }
        }
    }
}

/// Rate from the gap between the last two cycles' peak times.
fn single_cycle_rate(cycles: &[Cycle], total_items: f64) -> f64 {
    match cycles {
        [.., second_last, last] => per_interval_rate(secs_between(second_last.peak, last.peak)),
        _ => total_items,
    }
}

/// Rate from the up-crossing interval between the last two cycles.
fn two_cycle_rate(cycles: &[Cycle], total_items: f64) -> f64 {
    match cycles {
        [.., second_last, last] => {
            let t2_tail = secs_between(second_last.up, last.up);
            if t2_tail > 0.0 {
                QUARTER_HOUR_SECS / t2_tail
            } else {
                total_items
            }
        }
        _ => total_items,
    }
}
