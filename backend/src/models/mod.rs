//! Domain models for the risk quantification pipeline

pub mod feedback;
pub mod notice;
pub mod parameter;
pub mod state;

// Re-exports
pub use feedback::FeedbackDecision;
pub use notice::{Notice, Severity};
pub use parameter::{FairEstimate, FairFactor, FairParameters, FlatParameter, RiskFactorParameter};
pub use state::{slots, SessionState, Stage};
