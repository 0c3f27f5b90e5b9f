//! Cycle Engine Module
//!
//! Deterministic cycle analytics over one observation window. All math
//! here is pure arithmetic over the extracted event streams - no state,
//! no I/O.
//!
//! ## Leaf Functions
//! - `pair_cycles()` - three-stream merge into complete cycles
//! - `estimate_completion()` - partial cycles at the window edges
//! - `estimate_rate()` - items per 15 minutes under the selected strategy
//! - `integrate_mwh()` / `demand_mw()` - trapezoidal energy and demand
//!
//! ## Entry Point
//! - `analyze()` - the full pipeline: condition, extract, pair, estimate,
//!   integrate, one `AnalysisResult` per call

pub mod completion;
pub mod energy;
pub mod pairing;
pub mod rate;

pub use completion::{estimate_completion, CompletionEstimate, CompletionPolicy};
pub use energy::{
    demand_mw, energy_per_item_kwh, integrate_mwh, integrate_mwh_between, per_item_demand_mw,
};
pub use pairing::pair_cycles;
pub use rate::{estimate_rate, RateFigures};

use statrs::statistics::Statistics;
use tracing::debug;

use crate::config::{AnalysisConfig, DEFAULT_PROMINENCE_FRACTION};
use crate::processing::{condition_signal, find_peaks, threshold_crossings};
use crate::types::{AnalysisResult, RateStrategy, Sample};

/// Analyze one observation window of power telemetry.
///
/// Conditions the primary series (optionally subtracting an aligned
/// reference series), extracts peaks and threshold crossings, pairs them
/// into cycles, estimates partial cycles at the window edges, and derives
/// rate, energy, and demand figures under the configured strategy.
///
/// Pure function of its inputs: same series and config always produce the
/// same result, and nothing is retained across calls. Series shorter than
/// two samples yield an all-zero result.
pub fn analyze(
    primary: &[Sample],
    reference: Option<&[Sample]>,
    config: &AnalysisConfig,
) -> AnalysisResult {
    if primary.len() < 2 {
        return AnalysisResult::empty();
    }

    let conditioned = condition_signal(primary, reference, config.smooth_window);

    let prominence = config.prominence.unwrap_or_else(|| {
        let extent = Statistics::max(conditioned.iter()) - Statistics::min(conditioned.iter());
        DEFAULT_PROMINENCE_FRACTION * extent
    });

    let peak_indices = find_peaks(
        &conditioned,
        config.threshold,
        prominence,
        config.min_peak_distance,
    );
    let (up_indices, down_indices) = threshold_crossings(&conditioned, config.threshold);

    let peak_times: Vec<_> = peak_indices.iter().map(|&i| primary[i].timestamp).collect();
    let up_times: Vec<_> = up_indices.iter().map(|&i| primary[i].timestamp).collect();
    let down_times: Vec<_> = down_indices.iter().map(|&i| primary[i].timestamp).collect();

    let cycles = pair_cycles(&up_times, &peak_times, &down_times);

    let completion = estimate_completion(
        primary,
        &conditioned,
        config.threshold,
        &cycles,
        &up_times,
        &down_times,
        peak_times.len(),
        completion_policy(config.strategy),
    );

    let window_end = primary[primary.len() - 1].timestamp;
    let figures = estimate_rate(
        config.strategy,
        &peak_times,
        &cycles,
        window_end,
        completion.total_items,
        config.stall_cutoff_secs,
    );

    let energy_mwh = integrate_mwh(primary);
    let total_energy_kwh = energy_mwh * 1000.0;
    let per_item_kwh = energy_per_item_kwh(total_energy_kwh, completion.total_items);

    // Under the last-peaks strategy the per-item demand figure comes from
    // the energy between the last two peaks, not from the window total
    let demand_per_item = match config.strategy {
        RateStrategy::LastPeaksInterval => match peak_times[..] {
            [.., second_last, last] => {
                Some(demand_mw(integrate_mwh_between(primary, second_last, last)))
            }
            _ => None,
        },
        RateStrategy::SingleCycleBaseline | RateStrategy::TwoCycleBaseline => {
            per_item_kwh.map(per_item_demand_mw)
        }
    };

    debug!(
        strategy = config.strategy.short_code(),
        peaks = peak_times.len(),
        ups = up_times.len(),
        downs = down_times.len(),
        full_cycles = cycles.len(),
        total_items = completion.total_items,
        rate = figures.rate_items_per_15min,
        "Window analyzed"
    );

    AnalysisResult {
        full_cycles: cycles.len(),
        head_fraction: completion.head_fraction,
        tail_fraction: completion.tail_fraction,
        total_items: completion.total_items,
        rate_items_per_15min: figures.rate_items_per_15min,
        current_rate_items_per_15min: figures.current_rate_items_per_15min,
        total_energy_kwh,
        demand_mw: demand_mw(energy_mwh),
        energy_per_item_kwh: per_item_kwh,
        demand_per_item_mw: demand_per_item,
        cycles,
    }
}

/// Which completion baseline backs each strategy's partial-cycle math.
fn completion_policy(strategy: RateStrategy) -> CompletionPolicy {
    match strategy {
        RateStrategy::LastPeaksInterval | RateStrategy::SingleCycleBaseline => {
            CompletionPolicy::SingleCycle
        }
        RateStrategy::TwoCycleBaseline => CompletionPolicy::TwoCycle,
    }
}
