//! Workflow Orchestrator Engine
//!
//! Sequences the analysis stages as an explicit state machine:
//!
//! ```text
//!            initial_scenario set          risk_scenario_summary set
//!  Intake ───────────────────────▶ Scoping ─────────────────────────▶ Analysis ──▶ Done
//!    ▲  (precondition missing)       │ ▲   (precondition missing)        │
//!    └───────────────────────────────┘ └─────────────────────────────────┘
//! ```
//!
//! # Turn rule
//!
//! `advance` is called once per external turn. After a stage's handler runs,
//! the orchestrator continues to the next stage in the same turn if and only
//! if the stage's output slot is populated; otherwise it suspends and the
//! handler runs again next turn. Re-entry is therefore idempotent and a
//! handler may take any number of round-trips.
//!
//! The analysis stage runs its chain linearly, each step once, then moves
//! to `Done`. `Done` is terminal: further turns change nothing.
//!
//! # Example
//!
//! ```rust
//! use risk_quant_core_rs::models::{slots, SessionState, Stage};
//! use risk_quant_core_rs::orchestrator::{TurnStatus, WorkflowOrchestrator};
//! use risk_quant_core_rs::stages::{AnalysisChain, FnStage, HandlerOutcome};
//!
//! let orchestrator = WorkflowOrchestrator::new(
//!     Box::new(FnStage::new("intake", slots::INITIAL_SCENARIO, |_| {
//!         Ok(HandlerOutcome::awaiting("Do you have a risk scenario to quantify?"))
//!     })),
//!     Box::new(FnStage::new("scoping", slots::RISK_SCENARIO_SUMMARY, |_| {
//!         Ok(HandlerOutcome::awaiting_silently())
//!     })),
//!     AnalysisChain::new(),
//! );
//!
//! let mut session = SessionState::new();
//! let report = orchestrator.advance(&mut session).unwrap();
//! assert_eq!(report.status, TurnStatus::AwaitingInput);
//! assert_eq!(session.stage(), Some(&Stage::Intake));
//! ```

use crate::models::feedback::FeedbackDecision;
use crate::models::notice::Notice;
use crate::models::state::{slots, SessionState, Stage};
use crate::quant::QuantError;
use crate::stages::{AnalysisChain, HandlerOutcome, StageError, StageHandler};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Author name for notices raised by the orchestrator itself
pub const WORKFLOW_AUTHOR: &str = "workflow";

// ============================================================================
// Errors and Turn Reports
// ============================================================================

/// Errors that abort a turn
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Numeric inputs are invalid. The session stays in `stage` so the turn
    /// can be retried once the inputs are fixed. `notices` and
    /// `transitions` hold what the turn produced before it was aborted.
    #[error("Configuration error in '{handler}' during {stage}: {source}")]
    Configuration {
        stage: Stage,
        handler: String,
        #[source]
        source: QuantError,
        notices: Vec<Notice>,
        transitions: Vec<Transition>,
    },

    #[error("Operation not valid in stage {stage}: {reason}")]
    InvalidTransition { stage: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("State validation error: {0}")]
    StateValidationError(String),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Session {0} is unusable: a previous turn panicked while holding it")]
    SessionPoisoned(Uuid),
}

/// How a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// A handler is waiting for more external input
    AwaitingInput,
    /// A precondition fault or unrecognized stage moved the session back
    Reverted,
    /// A handler failed; the same stage runs again next turn
    HandlerFailed,
    /// The analysis chain ran and the session reached `Done`
    Completed,
    /// The session was already `Done`
    AlreadyDone,
}

/// A stage change made during a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: Stage,
    pub to: Stage,
}

/// Everything a caller needs after one `advance`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub status: TurnStatus,
    /// Stage the session rests in after the turn
    pub stage: Stage,
    pub notices: Vec<Notice>,
    pub transitions: Vec<Transition>,
    /// Reviewer decision, once the feedback step has recorded one
    pub feedback: Option<FeedbackDecision>,
}

impl TurnReport {
    pub fn has_errors(&self) -> bool {
        self.notices.iter().any(Notice::is_error)
    }
}

#[derive(Default)]
struct TurnLog {
    notices: Vec<Notice>,
    transitions: Vec<Transition>,
}

impl TurnLog {
    fn finish(self, state: &SessionState, status: TurnStatus) -> TurnReport {
        TurnReport {
            status,
            stage: state.stage().cloned().unwrap_or(Stage::Intake),
            notices: self.notices,
            transitions: self.transitions,
            feedback: state
                .populated_slot(slots::USER_FEEDBACK_DECISION)
                .and_then(FeedbackDecision::from_value),
        }
    }
}

/// Result of running one handler
enum StepResult {
    /// Output slot is populated after the run
    Populated,
    /// Output slot still empty
    Pending,
    /// Handler returned a non-configuration error (already logged as notice)
    Failed,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Resumable workflow state machine
///
/// Holds the injected stage handlers and no per-session data, so one
/// orchestrator can serve many sessions concurrently. Callers must not run
/// two turns of the same session at once; `&mut SessionState` enforces that
/// within one process.
pub struct WorkflowOrchestrator {
    intake: Box<dyn StageHandler>,
    scoping: Box<dyn StageHandler>,
    analysis: AnalysisChain,
}

impl WorkflowOrchestrator {
    pub fn new(
        intake: Box<dyn StageHandler>,
        scoping: Box<dyn StageHandler>,
        analysis: AnalysisChain,
    ) -> Self {
        Self {
            intake,
            scoping,
            analysis,
        }
    }

    pub fn analysis_chain(&self) -> &AnalysisChain {
        &self.analysis
    }

    /// Run one external turn
    ///
    /// # Errors
    /// `WorkflowError::Configuration` when a handler reports invalid numeric
    /// inputs. Every other fault is reported as a notice in the returned
    /// `TurnReport` and leaves the session resumable.
    pub fn advance(&self, state: &mut SessionState) -> Result<TurnReport, WorkflowError> {
        let mut log = TurnLog::default();
        let session_id = state.id();

        if state.stage().is_none() {
            debug!(%session_id, "new session; starting at intake");
            state.set_stage(Stage::Intake);
        }

        loop {
            let current = state.stage().cloned().unwrap_or(Stage::Intake);
            debug!(%session_id, stage = %current, "processing stage");

            match &current {
                Stage::Intake => match self.run_step(&*self.intake, &current, state, &mut log)? {
                    StepResult::Populated => {
                        self.transition(state, Stage::Scoping, &mut log);
                    }
                    StepResult::Pending => {
                        return Ok(log.finish(state, TurnStatus::AwaitingInput));
                    }
                    StepResult::Failed => {
                        return Ok(log.finish(state, TurnStatus::HandlerFailed));
                    }
                },

                Stage::Scoping => {
                    if !state.has_slot(slots::INITIAL_SCENARIO) {
                        return Ok(self.precondition_fault(
                            state,
                            Stage::Intake,
                            "Initial scenario missing. Please restart the process by providing a risk scenario.",
                            log,
                        ));
                    }

                    match self.run_step(&*self.scoping, &current, state, &mut log)? {
                        StepResult::Populated => {
                            self.transition(state, Stage::Analysis, &mut log);
                        }
                        StepResult::Pending => {
                            return Ok(log.finish(state, TurnStatus::AwaitingInput));
                        }
                        StepResult::Failed => {
                            return Ok(log.finish(state, TurnStatus::HandlerFailed));
                        }
                    }
                }

                Stage::Analysis => {
                    if !state.has_slot(slots::RISK_SCENARIO_SUMMARY) {
                        return Ok(self.precondition_fault(
                            state,
                            Stage::Scoping,
                            "Risk scenario summary missing. Please provide more details for the risk scenario.",
                            log,
                        ));
                    }

                    if !self.run_analysis(state, &mut log)? {
                        return Ok(log.finish(state, TurnStatus::HandlerFailed));
                    }

                    self.transition(state, Stage::Done, &mut log);
                    info!(%session_id, "analysis complete");
                    return Ok(log.finish(state, TurnStatus::Completed));
                }

                Stage::Done => {
                    debug!(%session_id, "workflow already done");
                    return Ok(log.finish(state, TurnStatus::AlreadyDone));
                }

                Stage::Unrecognized(raw) => {
                    warn!(%session_id, stage = %raw, "unknown workflow stage; resetting");
                    log.notices.push(Notice::fatal(
                        WORKFLOW_AUTHOR,
                        current.clone(),
                        format!("Unknown workflow step: {}. Resetting workflow.", raw),
                    ));
                    self.transition(state, Stage::Intake, &mut log);
                    return Ok(log.finish(state, TurnStatus::Reverted));
                }
            }
        }
    }

    /// Return a finished session to the analysis stage for another pass
    ///
    /// Clears every analysis output (parameters, results, curve, report,
    /// feedback) but keeps the scoped scenario, so the next `advance` re-runs
    /// the whole analysis chain.
    ///
    /// # Errors
    /// `WorkflowError::InvalidTransition` unless the session is `Done`.
    pub fn reopen_for_revision(&self, state: &mut SessionState) -> Result<Transition, WorkflowError> {
        match state.stage() {
            Some(Stage::Done) => {}
            other => {
                return Err(WorkflowError::InvalidTransition {
                    stage: other.map(|s| s.to_string()).unwrap_or_else(|| "unset".to_string()),
                    reason: "only a finished analysis can be revised".to_string(),
                });
            }
        }

        for slot in slots::ANALYSIS_OUTPUTS {
            state.clear_slot(slot);
        }
        state.set_stage(Stage::Analysis);
        info!(session_id = %state.id(), "analysis reopened for revision");

        Ok(Transition {
            from: Stage::Done,
            to: Stage::Analysis,
        })
    }

    /// Run every analysis step once, in order
    ///
    /// Returns `false` if a step failed and the chain stopped early.
    fn run_analysis(&self, state: &mut SessionState, log: &mut TurnLog) -> Result<bool, WorkflowError> {
        for step in self.analysis.steps() {
            match self.run_step(step.as_ref(), &Stage::Analysis, state, log)? {
                StepResult::Populated => {}
                StepResult::Pending => {
                    debug!(
                        session_id = %state.id(),
                        step = step.name(),
                        "analysis step finished without output; continuing"
                    );
                }
                StepResult::Failed => return Ok(false),
            }
        }
        Ok(true)
    }

    fn run_step(
        &self,
        handler: &dyn StageHandler,
        stage: &Stage,
        state: &mut SessionState,
        log: &mut TurnLog,
    ) -> Result<StepResult, WorkflowError> {
        let outcome = match handler.run(state) {
            Ok(outcome) => outcome,
            Err(StageError::Configuration(source)) => {
                warn!(
                    session_id = %state.id(),
                    handler = handler.name(),
                    error = %source,
                    "configuration error; turn aborted"
                );
                return Err(WorkflowError::Configuration {
                    stage: stage.clone(),
                    handler: handler.name().to_string(),
                    source,
                    notices: std::mem::take(&mut log.notices),
                    transitions: std::mem::take(&mut log.transitions),
                });
            }
            Err(StageError::Failed { handler: name, reason }) => {
                warn!(session_id = %state.id(), handler = %name, %reason, "handler failed");
                log.notices
                    .push(Notice::recoverable(name, stage.clone(), reason));
                return Ok(StepResult::Failed);
            }
        };

        for message in outcome.messages() {
            log.notices
                .push(Notice::info(handler.name(), stage.clone(), message.clone()));
        }

        if let HandlerOutcome::Completed { output, .. } = outcome {
            state.write_slot(handler.output_slot(), output);
        }

        if state.has_slot(handler.output_slot()) {
            Ok(StepResult::Populated)
        } else {
            Ok(StepResult::Pending)
        }
    }

    fn precondition_fault(
        &self,
        state: &mut SessionState,
        fallback: Stage,
        text: &str,
        mut log: TurnLog,
    ) -> TurnReport {
        let current = state.stage().cloned().unwrap_or(Stage::Intake);
        warn!(
            session_id = %state.id(),
            stage = %current,
            fallback = %fallback,
            "stage precondition missing; reverting"
        );
        log.notices
            .push(Notice::recoverable(WORKFLOW_AUTHOR, current, text));
        self.transition(state, fallback, &mut log);
        log.finish(state, TurnStatus::Reverted)
    }

    fn transition(&self, state: &mut SessionState, to: Stage, log: &mut TurnLog) {
        let from = state.stage().cloned().unwrap_or(Stage::Intake);
        debug!(session_id = %state.id(), %from, %to, "stage transition");
        state.set_stage(to.clone());
        log.transitions.push(Transition { from, to });
    }
}

impl std::fmt::Debug for WorkflowOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowOrchestrator")
            .field("intake", &self.intake.name())
            .field("scoping", &self.scoping.name())
            .field("analysis", &self.analysis)
            .finish()
    }
}
