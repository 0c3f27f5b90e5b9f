//! Event extraction: peaks and threshold crossings
//!
//! Derives the three event streams the cycle engine pairs, all from the
//! conditioned signal:
//!
//! - **Peaks**: strict local maxima at or above the threshold, gated by
//!   prominence and a minimum spacing. One production cycle completes at
//!   each accepted peak.
//! - **Up-crossings / down-crossings**: the sample index where the signal
//!   transitions across the threshold, marking cycle start and end.
//!
//! The streams are produced independently and each is strictly increasing
//! in index; cross-stream consistency is the cycle pairer's job.

use tracing::trace;

/// Find accepted peak indices in the conditioned signal.
///
/// A sample qualifies when it is a strict local maximum (a flat top of
/// width >1 counts once, at its first index), its value is at or above
/// `threshold`, its prominence is at least `prominence`, and it lies at
/// least `min_distance` samples after the previously accepted peak
/// (greedy, in time order).
pub fn find_peaks(
    conditioned: &[f64],
    threshold: f64,
    prominence: f64,
    min_distance: usize,
) -> Vec<usize> {
    let n = conditioned.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }

    let mut last_accepted: Option<usize> = None;
    let mut i = 1;
    while i < n - 1 {
        if conditioned[i] <= conditioned[i - 1] {
            i += 1;
            continue;
        }

        // Rising edge at i; extend across any flat top
        let mut plateau_end = i;
        while plateau_end + 1 < n && conditioned[plateau_end + 1] == conditioned[i] {
            plateau_end += 1;
        }
        if plateau_end + 1 >= n || conditioned[plateau_end + 1] > conditioned[i] {
            // Ran off the window or kept rising: not a local maximum
            i = plateau_end + 1;
            continue;
        }

        if conditioned[i] >= threshold {
            let prom = peak_prominence(conditioned, i);
            let spaced = last_accepted.map_or(true, |last| i - last >= min_distance);
            if prom >= prominence && spaced {
                peaks.push(i);
                last_accepted = Some(i);
            } else {
                trace!(
                    index = i,
                    prominence = prom,
                    spaced,
                    "Rejected peak candidate"
                );
            }
        }

        i = plateau_end + 1;
    }

    peaks
}

/// Prominence of the local maximum at `i`: its height above the higher of
/// the two base levels found by walking outward until a strictly higher
/// sample (or the window edge) terminates each walk. Samples equal to the
/// peak (its own flat top, or an equal twin peak) do not terminate a walk.
fn peak_prominence(conditioned: &[f64], i: usize) -> f64 {
    let peak = conditioned[i];

    let mut left_min = peak;
    let mut j = i;
    while j > 0 {
        j -= 1;
        if conditioned[j] > peak {
            break;
        }
        left_min = left_min.min(conditioned[j]);
    }

    let mut right_min = peak;
    let mut k = i;
    while k + 1 < conditioned.len() {
        k += 1;
        if conditioned[k] > peak {
            break;
        }
        right_min = right_min.min(conditioned[k]);
    }

    peak - left_min.max(right_min)
}

/// Find threshold crossing indices: `(up_crossings, down_crossings)`.
///
/// An up-crossing sits at index `i` when `cond[i] < threshold ≤
/// cond[i+1]`; a down-crossing at `i` when `cond[i] ≥ threshold >
/// cond[i+1]`. Both lists are strictly increasing. A signal entirely on
/// one side of the threshold yields two empty lists.
pub fn threshold_crossings(conditioned: &[f64], threshold: f64) -> (Vec<usize>, Vec<usize>) {
    let mut ups = Vec::new();
    let mut downs = Vec::new();

    for i in 0..conditioned.len().saturating_sub(1) {
        let below_now = conditioned[i] < threshold;
        let below_next = conditioned[i + 1] < threshold;
        if below_now && !below_next {
            ups.push(i);
        } else if !below_now && below_next {
            downs.push(i);
        }
    }

    (ups, downs)
}
