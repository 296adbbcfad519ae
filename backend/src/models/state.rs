//! Session State
//!
//! The single mutable record of one analysis session: the current workflow
//! stage plus named slots written by stage handlers.
//!
//! # Critical Invariants
//!
//! 1. **Single writer**: only the orchestrator changes `stage` or writes
//!    slots; handlers only ever see `&SessionState`
//! 2. **Presence**: a slot counts as present only when it holds a non-empty
//!    value (not null, `""`, `[]`, or `{}`)
//! 3. **Stable layout**: slot names below are shared with every external
//!    handler and with persisted snapshots

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Stable slot names
pub mod slots {
    /// Written by the intake step
    pub const INITIAL_SCENARIO: &str = "initial_scenario";
    /// Written by the scoping step
    pub const RISK_SCENARIO_SUMMARY: &str = "risk_scenario_summary";
    /// Written by the vulnerability intelligence step
    pub const VULNERABILITY_INTELLIGENCE: &str = "vulnerability_intelligence";
    /// Written by the factor estimation step
    pub const FAIR_PARAMETERS: &str = "fair_parameters";
    /// Written by the quantitative risk stage
    pub const SIMULATION_RESULTS: &str = "simulation_results";
    /// Written by the loss exceedance stage
    pub const LOSS_EXCEEDANCE_CURVE: &str = "loss_exceedance_curve";
    /// Written by the report authoring step
    pub const FINAL_REPORT: &str = "final_report";
    /// Written by the feedback step
    pub const USER_FEEDBACK_DECISION: &str = "user_feedback_decision";

    /// Outputs of the analysis chain, cleared when an analysis is revised
    pub const ANALYSIS_OUTPUTS: [&str; 6] = [
        VULNERABILITY_INTELLIGENCE,
        FAIR_PARAMETERS,
        SIMULATION_RESULTS,
        LOSS_EXCEEDANCE_CURVE,
        FINAL_REPORT,
        USER_FEEDBACK_DECISION,
    ];
}

/// Workflow stage
///
/// Persisted as a lowercase string. Values the orchestrator does not know
/// are kept as `Unrecognized` so a corrupted session can be recovered
/// instead of failing to load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Stage {
    Intake,
    Scoping,
    Analysis,
    Done,
    Unrecognized(String),
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Intake => "intake",
            Stage::Scoping => "scoping",
            Stage::Analysis => "analysis",
            Stage::Done => "done",
            Stage::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for Stage {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            // "greeting" is the legacy name of the intake stage
            "intake" | "greeting" => Stage::Intake,
            "scoping" => Stage::Scoping,
            "analysis" => Stage::Analysis,
            "done" => Stage::Done,
            _ => Stage::Unrecognized(raw),
        }
    }
}

impl From<&str> for Stage {
    fn from(raw: &str) -> Self {
        Stage::from(raw.to_string())
    }
}

impl From<Stage> for String {
    fn from(stage: Stage) -> Self {
        stage.as_str().to_string()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when `value` counts as a populated slot
pub fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Complete state of one analysis session
///
/// # Example
///
/// ```rust
/// use risk_quant_core_rs::models::state::{slots, SessionState, Stage};
/// use std::collections::BTreeMap;
///
/// let fresh = SessionState::new();
/// assert_eq!(fresh.stage(), None);
///
/// let mut stored = BTreeMap::new();
/// stored.insert(slots::INITIAL_SCENARIO.to_string(), "ransomware on billing".into());
/// let resumed = SessionState::restore(fresh.id(), Some(Stage::Scoping), stored);
/// assert!(resumed.has_slot(slots::INITIAL_SCENARIO));
/// assert!(!resumed.has_slot(slots::RISK_SCENARIO_SUMMARY));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    session_id: Uuid,

    /// `None` until the orchestrator's first turn
    stage: Option<Stage>,

    slots: BTreeMap<String, Value>,
}

impl SessionState {
    /// New session with a random id
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(session_id: Uuid) -> Self {
        Self {
            session_id,
            stage: None,
            slots: BTreeMap::new(),
        }
    }

    /// Rebuild a session from persisted parts
    pub fn restore(session_id: Uuid, stage: Option<Stage>, slots: BTreeMap<String, Value>) -> Self {
        Self {
            session_id,
            stage,
            slots,
        }
    }

    pub fn id(&self) -> Uuid {
        self.session_id
    }

    pub fn stage(&self) -> Option<&Stage> {
        self.stage.as_ref()
    }

    /// Raw slot value, populated or not
    pub fn slot(&self, name: &str) -> Option<&Value> {
        self.slots.get(name)
    }

    /// True when `name` holds a non-empty value
    pub fn has_slot(&self, name: &str) -> bool {
        self.slots.get(name).map(is_populated).unwrap_or(false)
    }

    /// Populated slot value
    pub fn populated_slot(&self, name: &str) -> Option<&Value> {
        self.slots.get(name).filter(|value| is_populated(value))
    }

    pub fn slots(&self) -> &BTreeMap<String, Value> {
        &self.slots
    }

    pub fn into_parts(self) -> (Uuid, Option<Stage>, BTreeMap<String, Value>) {
        (self.session_id, self.stage, self.slots)
    }

    pub(crate) fn set_stage(&mut self, stage: Stage) {
        self.stage = Some(stage);
    }

    pub(crate) fn write_slot(&mut self, name: &str, value: Value) {
        self.slots.insert(name.to_string(), value);
    }

    pub(crate) fn clear_slot(&mut self, name: &str) -> Option<Value> {
        self.slots.remove(name)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
