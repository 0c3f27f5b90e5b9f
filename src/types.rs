//! Shared data structures for power-telemetry cycle analysis
//!
//! This module defines the core types flowing through the analysis pipeline:
//! - Input: `Sample` (timestamped power reading, MW)
//! - Intermediate: `Cycle` (one complete detected production event)
//! - Selection: `RateStrategy` (which rate-estimation rule to apply)
//! - Output: `AnalysisResult` (item counts, rates, energy and demand figures)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Input Series
// ============================================================================

/// One timestamped power reading.
///
/// A series is an ordered slice of samples with strictly increasing
/// timestamps and near-uniform spacing. The analyzer derives the nominal
/// sample interval from the first two samples; irregular spacing beyond
/// that is not compensated for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Acquisition timestamp
    pub timestamp: DateTime<Utc>,
    /// Instantaneous power draw in megawatts
    pub power_mw: f64,
}

impl Sample {
    /// Construct a sample from a timestamp and power value.
    pub fn new(timestamp: DateTime<Utc>, power_mw: f64) -> Self {
        Self { timestamp, power_mw }
    }
}

/// Nominal sample spacing in seconds, derived from the first two samples.
///
/// Returns 0.0 for series shorter than two samples.
pub fn sample_interval_secs(series: &[Sample]) -> f64 {
    match series {
        [first, second, ..] => secs_between(first.timestamp, second.timestamp),
        _ => 0.0,
    }
}

/// Total span of the series in seconds (first to last timestamp).
///
/// Returns 0.0 for series shorter than two samples.
pub fn window_span_secs(series: &[Sample]) -> f64 {
    match (series.first(), series.last()) {
        (Some(first), Some(last)) if series.len() >= 2 => {
            secs_between(first.timestamp, last.timestamp)
        }
        _ => 0.0,
    }
}

/// Signed seconds from `a` to `b` with sub-second resolution.
pub fn secs_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    (b - a).num_milliseconds() as f64 / 1000.0
}

// ============================================================================
// Detected Cycles
// ============================================================================

/// One complete detected production cycle.
///
/// Assembled by the cycle pairer from an up-crossing, a peak, and a
/// down-crossing of the conditioned signal, with the invariant
/// `up < peak < down`. The up-crossing marks the cycle start, the peak its
/// completion instant, the down-crossing its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    /// Threshold up-crossing: cycle start
    pub up: DateTime<Utc>,
    /// Local maximum of the conditioned signal: completion instant
    pub peak: DateTime<Utc>,
    /// Threshold down-crossing: cycle end
    pub down: DateTime<Utc>,
}

impl Cycle {
    /// Duration from up-crossing to down-crossing, in seconds.
    pub fn duration_secs(&self) -> f64 {
        secs_between(self.up, self.down)
    }
}

// ============================================================================
// Rate Strategy
// ============================================================================

/// Which rate-estimation rule the analyzer applies.
///
/// All three strategies share the same conditioning, event extraction, and
/// cycle pairing; only the rate figure (and the completion-estimate policy
/// backing it) differs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum RateStrategy {
    /// Live rate from the interval between the last two peaks, with a
    /// dual-threshold rule for the current-rate figure. Suited to
    /// dashboards tracking the process in near real time.
    #[default]
    LastPeaksInterval,
    /// Rate from the gap between the last two cycles' peak times, backed
    /// by the mean single-cycle duration for partial-cycle estimates.
    SingleCycleBaseline,
    /// Rate from the up-crossing interval between the last two cycles,
    /// backed by cycle-to-cycle start intervals for partial-cycle
    /// estimates.
    TwoCycleBaseline,
}

impl RateStrategy {
    /// Short code for logging
    pub fn short_code(&self) -> &'static str {
        match self {
            RateStrategy::LastPeaksInterval => "LAST_PEAKS",
            RateStrategy::SingleCycleBaseline => "T1",
            RateStrategy::TwoCycleBaseline => "T2",
        }
    }
}

impl std::fmt::Display for RateStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateStrategy::LastPeaksInterval => write!(f, "Last Peaks Interval"),
            RateStrategy::SingleCycleBaseline => write!(f, "Single-Cycle Baseline"),
            RateStrategy::TwoCycleBaseline => write!(f, "Two-Cycle Baseline"),
        }
    }
}

// ============================================================================
// Analysis Output
// ============================================================================

/// Output aggregate of one analysis window.
///
/// Created fresh per `analyze()` invocation and never mutated afterwards.
/// Per-item figures are `None` (not zero) when no items were counted;
/// downstream consumers must preserve that distinction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Number of fully paired (up, peak, down) cycles in the window
    pub full_cycles: usize,
    /// Fractional unfinished cycle straddling the window start, in [0, 1]
    pub head_fraction: f64,
    /// Fractional unfinished cycle straddling the window end, in [0, 1]
    pub tail_fraction: f64,
    /// Estimated items produced in the window, including partials
    pub total_items: f64,
    /// Backward-looking production rate, items per 15 minutes
    pub rate_items_per_15min: f64,
    /// Current production rate, items per 15 minutes. Under
    /// `LastPeaksInterval` this applies the stall cutoff and may differ
    /// from `rate_items_per_15min`; the baseline strategies report the
    /// same figure in both fields.
    pub current_rate_items_per_15min: f64,
    /// Total energy consumed over the window, kWh
    pub total_energy_kwh: f64,
    /// 15-minute-equivalent demand over the window, MW
    pub demand_mw: f64,
    /// Energy per produced item, kWh. `None` when `total_items` is zero.
    pub energy_per_item_kwh: Option<f64>,
    /// 15-minute demand contribution per item, MW. `None` when no figure
    /// is defined (zero items, or fewer than two peaks under
    /// `LastPeaksInterval`).
    pub demand_per_item_mw: Option<f64>,
    /// The paired cycles, in time order
    pub cycles: Vec<Cycle>,
}

impl AnalysisResult {
    /// An all-zero result for degenerate input (empty or single-sample
    /// series, or a window with no activity).
    pub fn empty() -> Self {
        Self {
            full_cycles: 0,
            head_fraction: 0.0,
            tail_fraction: 0.0,
            total_items: 0.0,
            rate_items_per_15min: 0.0,
            current_rate_items_per_15min: 0.0,
            total_energy_kwh: 0.0,
            demand_mw: 0.0,
            energy_per_item_kwh: None,
            demand_per_item_mw: None,
            cycles: Vec::new(),
        }
    }
}
