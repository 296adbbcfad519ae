//! User-visible notices emitted during a turn
//!
//! Every fault the orchestrator recovers from is surfaced as a notice rather
//! than swallowed. Handler messages (clarifying questions, progress updates)
//! travel the same way.
//!
//! # Example
//!
//! ```rust
//! use risk_quant_core_rs::models::{Notice, Severity, Stage};
//!
//! let notice = Notice::recoverable(
//!     "workflow",
//!     Stage::Scoping,
//!     "Initial scenario missing. Please provide a risk scenario.",
//! );
//! assert_eq!(notice.severity, Severity::Recoverable);
//! ```

use crate::models::state::Stage;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Handler output or progress message
    Info,
    /// The session reverted or paused; it stays resumable
    Recoverable,
    /// This turn was abandoned and the workflow reset
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: Severity,
    /// Handler name, or "workflow" for orchestrator notices
    pub author: String,
    /// Stage the notice was raised in
    pub stage: Stage,
    pub text: String,
}

impl Notice {
    pub fn info(author: impl Into<String>, stage: Stage, text: impl Into<String>) -> Self {
        Self::new(Severity::Info, author, stage, text)
    }

    pub fn recoverable(author: impl Into<String>, stage: Stage, text: impl Into<String>) -> Self {
        Self::new(Severity::Recoverable, author, stage, text)
    }

    pub fn fatal(author: impl Into<String>, stage: Stage, text: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, author, stage, text)
    }

    fn new(
        severity: Severity,
        author: impl Into<String>,
        stage: Stage,
        text: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            author: author.into(),
            stage,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity != Severity::Info
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Info => write!(f, "[{}] {}", self.author, self.text),
            Severity::Recoverable | Severity::Fatal => {
                write!(f, "[{}] Error: {}", self.author, self.text)
            }
        }
    }
}
