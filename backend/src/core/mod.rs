//! Core engine settings

pub mod config;

pub use config::{ConfigError, QuantConfig, DEFAULT_CURVE_POINTS, DEFAULT_RNG_SEED, DEFAULT_TRIALS};
