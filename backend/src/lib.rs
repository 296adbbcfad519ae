//! Risk Quantification Core - Rust Engine
//!
//! FAIR-style Monte Carlo loss simulation and the resumable workflow that
//! drives a risk scenario from intake to a reviewed report.
//!
//! # Architecture
//!
//! - **core**: Engine configuration
//! - **models**: Domain types (FAIR parameters, session state, notices)
//! - **distributions**: Three-point samplers
//! - **quant**: Resolver, simulation runner, exceedance curve, summary
//! - **stages**: Stage handler contract and the built-in numeric stages
//! - **orchestrator**: Workflow state machine, checkpoints, session store
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded RNG, one stream per trial)
//! 2. Handlers never mutate session state; only the orchestrator does
//! 3. FFI boundary is minimal and safe

// Module declarations
pub mod core;
pub mod distributions;
pub mod models;
pub mod orchestrator;
pub mod quant;
pub mod rng;
pub mod stages;

// Re-exports for convenience
pub use core::config::{ConfigError, QuantConfig};
pub use models::{
    feedback::FeedbackDecision,
    notice::{Notice, Severity},
    parameter::{FairEstimate, FairFactor, FairParameters, FlatParameter, RiskFactorParameter},
    state::{slots, SessionState, Stage},
};
pub use orchestrator::{
    SessionSnapshot, SessionStore, Transition, TurnReport, TurnStatus, WorkflowError,
    WorkflowOrchestrator,
};
pub use quant::{
    exceedance_curve, run_simulation, ExceedanceCurve, ExceedancePoint, LossDistribution,
    LossSummary, QuantError, SimulationRunner,
};
pub use rng::RngManager;
pub use stages::{
    AnalysisChain, FnStage, HandlerOutcome, LossExceedanceStage, QuantitativeRiskStage,
    StageError, StageHandler,
};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn risk_quant_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(ffi::simulation::run_simulation, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::simulation::exceedance_curve, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::simulation::summarize, m)?)?;
    Ok(())
}
