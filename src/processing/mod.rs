//! Signal processing module - conditioning and event extraction
//!
//! Leaf primitives of the analysis pipeline. `conditioning` turns the raw
//! power series into the conditioned signal (reference subtraction +
//! centered smoothing); `events` derives the three time-ordered event
//! streams (peaks, up-crossings, down-crossings) the cycle engine pairs.
//!
//! Everything here is a pure batch transform over borrowed slices: no
//! errors, no state, degenerate input yields empty output.

mod conditioning;
mod events;

pub use conditioning::condition_signal;
pub use events::{find_peaks, threshold_crossings};
