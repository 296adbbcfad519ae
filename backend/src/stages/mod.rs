//! Stage Handler Module
//!
//! Defines the interface every pipeline step implements. The orchestrator
//! decides **when** a handler runs and **whether** its precondition holds;
//! the handler decides **what** its output is.
//!
//! # Handler Interface
//!
//! Handlers receive an immutable view of the session and return an outcome.
//! They never write slots or change the stage themselves: on
//! `HandlerOutcome::Completed` the orchestrator stores the value under the
//! handler's declared `output_slot`.
//!
//! ```rust
//! use risk_quant_core_rs::models::{slots, SessionState};
//! use risk_quant_core_rs::stages::{HandlerOutcome, StageError, StageHandler};
//!
//! struct EchoIntake;
//!
//! impl StageHandler for EchoIntake {
//!     fn name(&self) -> &str {
//!         "intake"
//!     }
//!
//!     fn output_slot(&self) -> &str {
//!         slots::INITIAL_SCENARIO
//!     }
//!
//!     fn run(&self, _state: &SessionState) -> Result<HandlerOutcome, StageError> {
//!         Ok(HandlerOutcome::awaiting("Do you have a risk scenario to quantify?"))
//!     }
//! }
//! ```
//!
//! # Built-in handlers
//!
//! Content-producing steps (intake, scoping, vulnerability intelligence,
//! factor estimation, report authoring, feedback) are supplied by the caller.
//! The numeric steps are provided here:
//!
//! 1. **QuantitativeRiskStage**: `fair_parameters` → `simulation_results`
//! 2. **LossExceedanceStage**: `simulation_results` → `loss_exceedance_curve`

use crate::models::SessionState;
use crate::quant::QuantError;
use serde_json::Value;
use thiserror::Error;

pub mod chain;
pub mod exceedance;
pub mod quantitative;

pub use chain::AnalysisChain;
pub use exceedance::LossExceedanceStage;
pub use quantitative::{QuantitativeRiskStage, SimulationResults};

/// Result of one handler invocation
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    /// The handler produced its output
    Completed { output: Value, messages: Vec<String> },

    /// The handler needs another external round-trip before it can finish
    ///
    /// Not an error. The orchestrator suspends and re-runs the handler on
    /// the next turn.
    AwaitingInput { messages: Vec<String> },
}

impl HandlerOutcome {
    pub fn completed(output: impl Into<Value>) -> Self {
        HandlerOutcome::Completed {
            output: output.into(),
            messages: Vec::new(),
        }
    }

    pub fn awaiting(message: impl Into<String>) -> Self {
        HandlerOutcome::AwaitingInput {
            messages: vec![message.into()],
        }
    }

    pub fn awaiting_silently() -> Self {
        HandlerOutcome::AwaitingInput {
            messages: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        match &mut self {
            HandlerOutcome::Completed { messages, .. }
            | HandlerOutcome::AwaitingInput { messages } => messages.push(message.into()),
        }
        self
    }

    pub fn messages(&self) -> &[String] {
        match self {
            HandlerOutcome::Completed { messages, .. }
            | HandlerOutcome::AwaitingInput { messages } => messages,
        }
    }
}

/// Errors a handler can return
#[derive(Debug, Error)]
pub enum StageError {
    /// Numeric inputs are invalid; the caller must fix them before re-running
    #[error("Configuration error: {0}")]
    Configuration(#[from] QuantError),

    /// Any other failure; the session stays resumable
    #[error("Handler '{handler}' failed: {reason}")]
    Failed { handler: String, reason: String },
}

impl StageError {
    pub fn failed(handler: impl Into<String>, reason: impl Into<String>) -> Self {
        StageError::Failed {
            handler: handler.into(),
            reason: reason.into(),
        }
    }
}

/// One pipeline step
///
/// Handlers are shared across sessions (`Send + Sync`) and must keep any
/// per-session data in the session's slots.
pub trait StageHandler: Send + Sync {
    /// Name used as the author of notices and in logs
    fn name(&self) -> &str;

    /// The single slot this handler populates
    fn output_slot(&self) -> &str;

    /// Run against an immutable view of the session
    fn run(&self, state: &SessionState) -> Result<HandlerOutcome, StageError>;
}

/// Handler built from a closure
///
/// ```rust
/// use risk_quant_core_rs::models::slots;
/// use risk_quant_core_rs::stages::{FnStage, HandlerOutcome};
/// use serde_json::json;
///
/// let scoping = FnStage::new("scoping", slots::RISK_SCENARIO_SUMMARY, |_state| {
///     Ok(HandlerOutcome::completed(json!({"asset": "payments db", "threat_event": "ransomware"})))
/// });
/// # let _ = scoping;
/// ```
pub struct FnStage<F> {
    name: String,
    output_slot: String,
    body: F,
}

impl<F> FnStage<F>
where
    F: Fn(&SessionState) -> Result<HandlerOutcome, StageError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, output_slot: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            output_slot: output_slot.into(),
            body,
        }
    }
}

impl<F> StageHandler for FnStage<F>
where
    F: Fn(&SessionState) -> Result<HandlerOutcome, StageError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn output_slot(&self) -> &str {
        &self.output_slot
    }

    fn run(&self, state: &SessionState) -> Result<HandlerOutcome, StageError> {
        (self.body)(state)
    }
}
