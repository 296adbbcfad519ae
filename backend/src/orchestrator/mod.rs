//! Orchestrator - resumable workflow state machine
//!
//! See `engine.rs` for the turn loop, `checkpoint.rs` for snapshots, and
//! `store.rs` for per-session locking.

pub mod checkpoint;
pub mod engine;
pub mod store;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use engine::{
    Transition, TurnReport, TurnStatus, WorkflowError, WorkflowOrchestrator, WORKFLOW_AUTHOR,
};

// Re-export checkpoint types
pub use checkpoint::{SessionSnapshot, SNAPSHOT_VERSION};
pub use store::SessionStore;
