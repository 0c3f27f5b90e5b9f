//! Energy integration and demand conversion
//!
//! Trapezoidal integration of the raw power series (MW) over time (hours)
//! yields megawatt-hours. All demand figures use the 15-minute billing
//! convention: the average power over a quarter hour equals the energy in
//! that quarter hour times four, so MWh × 4 is the 15-minute-equivalent
//! demand in MW.
//!
//! Integration always runs on the unconditioned series: smoothing and
//! reference subtraction alter the signal, and the energy figures must
//! reflect what was actually drawn from the grid.

use chrono::{DateTime, Utc};

use crate::types::Sample;

/// MWh × 4 = MW demand on a 15-minute-average basis.
const MWH_TO_QUARTER_HOUR_MW: f64 = 4.0;

/// Trapezoidal integral of power over the whole series, in MWh.
///
/// A constant series of P MW spanning H hours integrates to exactly
/// P × H. Series shorter than two samples carry no energy.
pub fn integrate_mwh(series: &[Sample]) -> f64 {
    series
        .windows(2)
        .map(|pair| {
            let hours = (pair[1].timestamp - pair[0].timestamp).num_milliseconds() as f64
                / 3_600_000.0;
            (pair[0].power_mw + pair[1].power_mw) / 2.0 * hours
        })
        .sum()
}

/// Trapezoidal integral restricted to samples within `[from, to]`, in MWh.
///
/// Used by the last-peaks strategy to integrate between the last two peak
/// timestamps. Peaks are samples, so the bounds land on sample instants
/// and no partial-interval interpolation is needed.
pub fn integrate_mwh_between(
    series: &[Sample],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> f64 {
    let start = series.partition_point(|s| s.timestamp < from);
    let end = series.partition_point(|s| s.timestamp <= to);
    integrate_mwh(&series[start..end])
}

/// 15-minute-equivalent demand in MW for an energy amount in MWh.
pub fn demand_mw(energy_mwh: f64) -> f64 {
    energy_mwh * MWH_TO_QUARTER_HOUR_MW
}

/// Energy per item in kWh; `None` when no items were counted.
pub fn energy_per_item_kwh(total_energy_kwh: f64, total_items: f64) -> Option<f64> {
    if total_items > 0.0 {
        Some(total_energy_kwh / total_items)
    } else {
        None
    }
}

/// Per-item 15-minute demand in MW from a per-item energy in kWh.
pub fn per_item_demand_mw(per_item_kwh: f64) -> f64 {
    per_item_kwh * MWH_TO_QUARTER_HOUR_MW / 1000.0
}
