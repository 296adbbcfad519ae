//! Python bindings
//!
//! Exposes the quantification engine to Python-hosted agents. The workflow
//! itself stays in Rust; Python only calls the numeric entry points.

pub mod simulation;
pub mod types;
