//! Reviewer decision recorded by the feedback step
//!
//! The `user_feedback_decision` slot holds `{"user_feedback": "accept"}`
//! (or `reject` / `revise`). A bare string or a JSON string inside a fenced
//! block is accepted as well.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackDecision {
    /// The report is accepted as final
    Accept,
    /// The reviewer wants to stop the analysis
    Reject,
    /// Re-estimate the FAIR parameters and re-run the simulation
    Revise,
}

impl FeedbackDecision {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "accept" => Some(FeedbackDecision::Accept),
            "reject" => Some(FeedbackDecision::Reject),
            "revise" => Some(FeedbackDecision::Revise),
            _ => None,
        }
    }

    /// Read the decision from a slot value; `None` if it is not recognizable
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => map
                .get("user_feedback")
                .and_then(Value::as_str)
                .and_then(Self::parse),
            Value::String(text) => Self::parse(text).or_else(|| {
                let body = text
                    .trim()
                    .trim_start_matches("```json")
                    .trim_start_matches("```")
                    .trim_end_matches("```");
                serde_json::from_str::<Value>(body)
                    .ok()
                    .as_ref()
                    .filter(|inner| inner.is_object())
                    .and_then(Self::from_value)
            }),
            _ => None,
        }
    }
}
