//! PyO3 wrappers for the simulation entry points
//!
//! # Example (from Python)
//!
//! ```python
//! from risk_quant_core_rs import run_simulation, exceedance_curve, summarize
//!
//! params = {
//!     "TEF": {"min": 1, "most_likely": 2, "max": 3},
//!     "Vuln": {"min": 0.1, "most_likely": 0.3, "max": 0.5},
//!     "LM_Primary": {"min": 1e6, "most_likely": 5e6, "max": 1e7},
//!     "LM_Secondary": {
//!         "legal": {"min": 0, "most_likely": 1e5, "max": 5e5},
//!         "reputation": {"min": 0, "most_likely": 2e5, "max": 1e6},
//!     },
//! }
//!
//! losses = run_simulation(params, trials=10_000, seed=42)
//! curve = exceedance_curve(losses)
//! print(summarize(losses)["p95"])
//! ```

use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{parse_fair_parameters, quant_error_to_py, summary_to_py};
use crate::core::config::{QuantConfig, DEFAULT_RNG_SEED, DEFAULT_TRIALS};
use crate::quant::{self, LossDistribution, LossSummary, SimulationRunner};

/// Run the Monte Carlo simulation and return the annualized losses
///
/// # Errors
///
/// Raises ValueError if a factor is malformed, has invalid bounds, or names
/// an unsupported distribution.
#[pyfunction]
#[pyo3(signature = (params, trials = DEFAULT_TRIALS, seed = DEFAULT_RNG_SEED, parallel = false))]
pub fn run_simulation(
    py: Python<'_>,
    params: &Bound<'_, PyDict>,
    trials: usize,
    seed: u64,
    parallel: bool,
) -> PyResult<Vec<f64>> {
    let params = parse_fair_parameters(params)?;
    let config = QuantConfig::default()
        .with_trials(trials)
        .with_seed(seed)
        .with_parallel(parallel);

    let run = py
        .allow_threads(|| SimulationRunner::new(config).run(&params))
        .map_err(quant_error_to_py)?;
    Ok(run.distribution.into_inner())
}

/// Empirical exceedance curve as `(loss, probability)` pairs, largest loss
/// first
///
/// # Errors
///
/// Raises ValueError for an empty loss list.
#[pyfunction]
pub fn exceedance_curve(losses: Vec<f64>) -> PyResult<Vec<(f64, f64)>> {
    quant::exceedance_pairs(losses).map_err(quant_error_to_py)
}

/// Headline statistics (mean, median, p90/p95/p99, min, max)
///
/// # Errors
///
/// Raises ValueError for an empty loss list.
#[pyfunction]
pub fn summarize(py: Python<'_>, losses: Vec<f64>) -> PyResult<Py<PyDict>> {
    let summary =
        LossSummary::from_distribution(&LossDistribution::new(losses)).map_err(quant_error_to_py)?;
    summary_to_py(py, &summary)
}
