//! Cyclemetry: cycle counting and demand analytics for batch-process
//! power telemetry
//!
//! Infers production activity from a noisy, periodically-sampled power
//! signal of a batch process (an electric furnace cycling on and off):
//! how many production cycles fell inside an observation window including
//! partials at the edges, the current and recent production rate in items
//! per 15 minutes, and the energy and 15-minute peak-demand contribution
//! per item.
//!
//! ## Pipeline
//!
//! - **Signal conditioning**: reference subtraction + centered smoothing
//! - **Event extraction**: peaks and threshold up/down-crossings
//! - **Cycle pairing**: three-stream merge into complete cycles
//! - **Completion estimation**: fractional cycles at the window edges
//! - **Rate estimation**: three strategies over the same events
//! - **Energy integration**: trapezoidal MWh over the raw series
//!
//! The whole crate is synchronous and stateless: `analyze()` is a pure
//! function from a borrowed series plus configuration to one
//! [`AnalysisResult`], safe to call from any number of threads without
//! coordination.
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use cyclemetry::{analyze, AnalysisConfig, Sample};
//!
//! let start = Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap();
//! let series: Vec<Sample> = [0.0, 0.0, 8.0, 10.0, 8.0, 0.0, 0.0]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &mw)| Sample::new(start + Duration::seconds(i as i64 * 60), mw))
//!     .collect();
//!
//! let mut config = AnalysisConfig::with_threshold(5.0);
//! config.smooth_window = 0;
//! let result = analyze(&series, None, &config);
//! assert_eq!(result.full_cycles, 1);
//! ```

pub mod config;
pub mod cycle_engine;
pub mod processing;
pub mod types;

// Re-export the analysis entry point
pub use cycle_engine::analyze;

// Re-export configuration
pub use config::{AnalysisConfig, ConfigError};

// Re-export commonly used types
pub use types::{AnalysisResult, Cycle, RateStrategy, Sample};
