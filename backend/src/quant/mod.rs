//! Quantification engine
//!
//! Pure functions from FAIR parameters to a loss distribution and its
//! exceedance curve:
//!
//! ```text
//! FairParameters ──resolver──▶ per-trial samples ──simulation──▶ LossDistribution
//!                                                                   │
//!                                                    exceedance ◀───┘──▶ summary
//! ```

pub mod error;
pub mod exceedance;
pub mod resolver;
pub mod simulation;
pub mod summary;

pub use error::QuantError;
pub use exceedance::{exceedance_curve, exceedance_pairs, ExceedanceCurve, ExceedancePoint};
pub use resolver::{resolve_sample, ResolvedFactors};
pub use simulation::{run_simulation, LossDistribution, SimulationRun, SimulationRunner};
pub use summary::LossSummary;
