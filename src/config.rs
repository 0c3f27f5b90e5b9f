//! Analysis Configuration - all detection tunables as TOML-loadable values
//!
//! Every tunable of the analysis pipeline is a field here, loadable from a
//! TOML file with serde defaults matching the documented constants. There
//! is no global configuration state: the analyzer is a pure function and
//! takes its configuration by reference on every call, so independent
//! callers can analyze different feeds with different settings without
//! coordination.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::types::RateStrategy;

/// Default centered smoothing window, in samples.
pub const DEFAULT_SMOOTH_WINDOW: usize = 3;

/// Default minimum spacing between accepted peaks, in samples.
pub const DEFAULT_MIN_PEAK_DISTANCE: usize = 1;

/// Fraction of the conditioned signal's (max − min) used as the prominence
/// requirement when none is configured.
pub const DEFAULT_PROMINENCE_FRACTION: f64 = 0.3;

/// Seconds without a new peak after which the current rate is judged
/// stalled under [`RateStrategy::LastPeaksInterval`]. Matches the cadence
/// of the batch processes this was tuned on.
pub const DEFAULT_STALL_CUTOFF_SECS: f64 = 420.0;

// ============================================================================
// Errors
// ============================================================================

/// Errors from configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ============================================================================
// Analysis Config
// ============================================================================

/// Tunables for one analysis invocation.
///
/// `threshold` is the only field without a usable default: it is the
/// power level (MW, on the conditioned signal) separating an active
/// production cycle from the idle baseline and is specific to the
/// monitored process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Activity threshold on the conditioned signal, MW
    pub threshold: f64,

    /// Centered moving-average window in samples; 0 or 1 disables
    /// smoothing
    #[serde(default = "default_smooth_window")]
    pub smooth_window: usize,

    /// Minimum spacing between accepted peaks, in samples
    #[serde(default = "default_min_peak_distance")]
    pub min_peak_distance: usize,

    /// Required peak prominence, MW. When absent, defaults per window to
    /// [`DEFAULT_PROMINENCE_FRACTION`] × (max − min) of the conditioned
    /// signal.
    #[serde(default)]
    pub prominence: Option<f64>,

    /// Rate-estimation strategy
    #[serde(default)]
    pub strategy: RateStrategy,

    /// Seconds without a new peak before the current rate reads as
    /// stalled (LastPeaksInterval only)
    #[serde(default = "default_stall_cutoff_secs")]
    pub stall_cutoff_secs: f64,
}

fn default_smooth_window() -> usize {
    DEFAULT_SMOOTH_WINDOW
}

fn default_min_peak_distance() -> usize {
    DEFAULT_MIN_PEAK_DISTANCE
}

fn default_stall_cutoff_secs() -> f64 {
    DEFAULT_STALL_CUTOFF_SECS
}

impl AnalysisConfig {
    /// Construct a config with the given threshold and defaults for every
    /// other field.
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            smooth_window: DEFAULT_SMOOTH_WINDOW,
            min_peak_distance: DEFAULT_MIN_PEAK_DISTANCE,
            prominence: None,
            strategy: RateStrategy::default(),
            stall_cutoff_secs: DEFAULT_STALL_CUTOFF_SECS,
        }
    }

    /// Select a different rate strategy, keeping all other fields.
    pub fn with_strategy(mut self, strategy: RateStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), strategy = %config.strategy, "Loaded analysis config");
        Ok(config)
    }

    /// Range-check every field.
    ///
    /// The analysis path itself never fails; catching nonsensical
    /// tunables here is the only fallible step.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() {
            return Err(ConfigError::Invalid {
                field: "threshold",
                reason: format!("must be finite, got {}", self.threshold),
            });
        }
        if let Some(p) = self.prominence {
            if !p.is_finite() || p < 0.0 {
                return Err(ConfigError::Invalid {
                    field: "prominence",
                    reason: format!("must be finite and non-negative, got {p}"),
                });
            }
        }
        if !self.stall_cutoff_secs.is_finite() || self.stall_cutoff_secs <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "stall_cutoff_secs",
                reason: format!("must be positive, got {}", self.stall_cutoff_secs),
            });
        }
        Ok(())
    }
}
