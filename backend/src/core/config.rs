//! Engine configuration
//!
//! Every field has a default, so an empty JSON object is a valid config.
//!
//! # Example
//! ```
//! use risk_quant_core_rs::QuantConfig;
//!
//! let config = QuantConfig::from_json_str(r#"{"trials": 500, "parallel": true}"#).unwrap();
//! assert_eq!(config.trials, 500);
//! assert_eq!(config.rng_seed, QuantConfig::default().rng_seed);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default number of Monte Carlo trials
pub const DEFAULT_TRIALS: usize = 10_000;

/// Default RNG seed (runs are reproducible unless a seed is supplied)
pub const DEFAULT_RNG_SEED: u64 = 0x5EED_CAFE;

/// Default number of points kept in a plot-ready exceedance curve
pub const DEFAULT_CURVE_POINTS: usize = 200;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Quantification engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantConfig {
    /// Monte Carlo trial count (0 yields an empty distribution)
    pub trials: usize,

    /// Seed for deterministic sampling
    pub rng_seed: u64,

    /// Run trials on the rayon thread pool
    pub parallel: bool,

    /// Maximum points stored in the `loss_exceedance_curve` slot; 0 keeps
    /// every trial
    pub curve_points: usize,
}

impl Default for QuantConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            rng_seed: DEFAULT_RNG_SEED,
            parallel: false,
            curve_points: DEFAULT_CURVE_POINTS,
        }
    }
}

impl QuantConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
