//! Signal conditioning: reference subtraction + centered smoothing
//!
//! Turns a raw power series into the conditioned signal all event
//! detection runs on. An optional reference series (e.g. a neighbouring
//! load measured on the same feeder) is subtracted positionally to
//! compensate interference; the difference is then smoothed with a
//! centered moving average. Edge positions that lack a full window are
//! filled from the nearest fully-windowed value so the output always has
//! the input's length.
//!
//! Alignment of primary and reference is the caller's contract: both
//! series must share the same time axis. No join logic happens here.

use crate::types::Sample;

/// Condition a power series for event detection.
///
/// Output length equals `primary.len()`. A `smooth_window` of 0 or 1
/// disables smoothing; a window longer than the series leaves no position
/// with a full centered window, so smoothing is skipped there too and the
/// difference signal passes through unchanged.
pub fn condition_signal(
    primary: &[Sample],
    reference: Option<&[Sample]>,
    smooth_window: usize,
) -> Vec<f64> {
    let diff: Vec<f64> = match reference {
        Some(reference) => primary
            .iter()
            .enumerate()
            .map(|(i, s)| s.power_mw - reference.get(i).map_or(0.0, |r| r.power_mw))
            .collect(),
        None => primary.iter().map(|s| s.power_mw).collect(),
    };

    smooth_centered(&diff, smooth_window)
}

/// Centered moving average of window `w` with edge fill.
///
/// The window at position `i` covers `[i - (w-1)/2, i + w/2]`. Leading
/// positions are backward-filled from the first fully-windowed mean,
/// trailing positions forward-filled from the last.
fn smooth_centered(signal: &[f64], w: usize) -> Vec<f64> {
    let n = signal.len();
    if w <= 1 || n < w {
        return signal.to_vec();
    }

    let left = (w - 1) / 2;
    let right = w / 2;
    let scale = 1.0 / w as f64;

    let mut out = vec![0.0; n];

    // Running-sum pass over the valid centered positions [left, n-1-right]
    let mut sum: f64 = signal[..w].iter().sum();
    out[left] = sum * scale;
    for i in left + 1..n - right {
        sum += signal[i + right] - signal[i - left - 1];
        out[i] = sum * scale;
    }

    // Edge fill
    let first_valid = out[left];
    let last_valid = out[n - 1 - right];
    for v in &mut out[..left] {
        *v = first_valid;
    }
    for v in &mut out[n - right..] {
        *v = last_valid;
    }

    out
}
