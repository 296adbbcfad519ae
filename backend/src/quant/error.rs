//! Errors raised by the quantification engine
//!
//! Every variant except `NoData` is a configuration error: the numeric
//! inputs must be fixed by the caller before the simulation can run.

use thiserror::Error;

/// Errors from sampling, parameter resolution, and curve generation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuantError {
    #[error("Unsupported distribution '{distribution}' for factor '{factor}' (only 'triangular' is implemented)")]
    UnsupportedDistribution { factor: String, distribution: String },

    #[error("Invalid bounds for factor '{factor}': require min <= most_likely <= max, got ({min}, {most_likely}, {max})")]
    InvalidBounds {
        factor: String,
        min: f64,
        most_likely: f64,
        max: f64,
    },

    #[error("Non-finite bound for factor '{factor}'")]
    NonFiniteBound { factor: String },

    #[error("Invalid risk factor parameters: {0}")]
    InvalidParameters(String),

    #[error("No simulation data: the loss distribution is empty")]
    NoData,
}

impl QuantError {
    /// True for errors the caller must fix in the numeric inputs
    pub fn is_configuration(&self) -> bool {
        !matches!(self, QuantError::NoData)
    }
}
