//! Cycle pairing: three-stream merge of up-crossings, peaks, and
//! down-crossings
//!
//! Assembles complete production cycles from the three independently
//! extracted event streams. Strict three-way synchronization: no event is
//! used by two cycles, stray events with no matching partners are dropped
//! silently, and the stream pointers only move forward, so the result is a
//! deterministic function of the three sorted inputs.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::types::Cycle;

/// Pair the three sorted event streams into complete cycles.
///
/// Walks one pointer per stream. A triple `(u, p, d)` with `u < p < d` is
/// emitted as a cycle and all three pointers advance; otherwise the
/// stalest candidate is discarded: a peak at or before the pending
/// up-crossing, then a down-crossing at or before the pending peak, then a
/// lagging up-crossing. Terminates when any stream is exhausted; leftover
/// events are left to the completion estimator.
pub fn pair_cycles(
    ups: &[DateTime<Utc>],
    peaks: &[DateTime<Utc>],
    downs: &[DateTime<Utc>],
) -> Vec<Cycle> {
    let mut cycles = Vec::new();
    let (mut i, mut j, mut k) = (0, 0, 0);

    while i < ups.len() && j < peaks.len() && k < downs.len() {
        let (u, p, d) = (ups[i], peaks[j], downs[k]);

        if u < p && p < d {
            cycles.push(Cycle { up: u, peak: p, down: d });
            i += 1;
            j += 1;
            k += 1;
        } else if p <= u {
            trace!(peak = %p, up = %u, "Dropping stale peak");
            j += 1;
        } else if d <= p {
            trace!(down = %d, peak = %p, "Dropping stale down-crossing");
            k += 1;
        } else {
            trace!(up = %u, "Dropping unmatched up-crossing");
            i += 1;
        }
    }

    cycles
}
