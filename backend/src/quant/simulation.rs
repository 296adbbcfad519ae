//! Monte Carlo simulation runner
//!
//! Each trial computes one annualized loss:
//!
//! ```text
//! loss_event_frequency = TEF × Vuln
//! loss_per_event       = LM_Primary + LM_Secondary
//! annualized_loss      = loss_event_frequency × loss_per_event
//! ```
//!
//! Trials are independent and identically distributed. Every trial draws
//! from its own `RngManager::for_trial(seed, index)` stream, so the
//! sequential and parallel paths return identical distributions.

use crate::core::config::QuantConfig;
use crate::models::parameter::{FairFactor, FairParameters};
use crate::quant::resolver::ResolvedFactors;
use crate::quant::QuantError;
use crate::rng::RngManager;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// All trial outcomes of one run
///
/// Order carries no meaning. An empty distribution means "no result" and
/// is never equivalent to a run whose losses are all zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LossDistribution {
    losses: Vec<f64>,
}

impl LossDistribution {
    pub fn new(losses: Vec<f64>) -> Self {
        Self { losses }
    }

    pub fn losses(&self) -> &[f64] {
        &self.losses
    }

    pub fn len(&self) -> usize {
        self.losses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.losses.is_empty()
    }

    /// Annualized loss expectancy; `None` for an empty distribution
    pub fn mean(&self) -> Option<f64> {
        if self.losses.is_empty() {
            return None;
        }
        Some(self.losses.iter().sum::<f64>() / self.losses.len() as f64)
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.losses
    }
}

impl From<Vec<f64>> for LossDistribution {
    fn from(losses: Vec<f64>) -> Self {
        Self::new(losses)
    }
}

/// Result of `SimulationRunner::run`
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRun {
    pub distribution: LossDistribution,
    /// Factors that were absent and sampled as zero
    pub substituted: Vec<FairFactor>,
    pub rng_seed: u64,
}

/// Runs the FAIR Monte Carlo simulation
#[derive(Debug, Clone, Default)]
pub struct SimulationRunner {
    config: QuantConfig,
}

impl SimulationRunner {
    pub fn new(config: QuantConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QuantConfig {
        &self.config
    }

    /// Run `config.trials` trials
    ///
    /// # Errors
    /// Configuration errors in any factor are reported before any trial
    /// runs.
    pub fn run(&self, params: &FairParameters) -> Result<SimulationRun, QuantError> {
        let factors = ResolvedFactors::resolve(params)?;

        for factor in &factors.substituted {
            warn!(
                factor = factor.key(),
                "risk factor missing; sampling as zero (result will under-estimate loss)"
            );
        }

        let trials = self.config.trials;
        let seed = self.config.rng_seed;

        if trials == 0 {
            debug!("trial count is zero; returning empty distribution");
            return Ok(SimulationRun {
                distribution: LossDistribution::default(),
                substituted: factors.substituted,
                rng_seed: seed,
            });
        }

        let losses: Vec<f64> = if self.config.parallel {
            (0..trials)
                .into_par_iter()
                .map(|index| run_trial(&factors, seed, index as u64))
                .collect()
        } else {
            (0..trials)
                .map(|index| run_trial(&factors, seed, index as u64))
                .collect()
        };

        let distribution = LossDistribution::new(losses);
        info!(
            trials,
            seed,
            parallel = self.config.parallel,
            mean_loss = distribution.mean().unwrap_or(0.0),
            "simulation complete"
        );

        Ok(SimulationRun {
            distribution,
            substituted: factors.substituted,
            rng_seed: seed,
        })
    }
}

/// Run `trials` trials with the given seed, sequentially
///
/// # Example
/// ```
/// use risk_quant_core_rs::models::{FairFactor, FairParameters, RiskFactorParameter};
/// use risk_quant_core_rs::quant::run_simulation;
///
/// let params = FairParameters::default()
///     .with(FairFactor::ThreatEventFrequency, RiskFactorParameter::triangular(1.0, 2.0, 3.0))
///     .with(FairFactor::Vulnerability, RiskFactorParameter::triangular(0.1, 0.3, 0.5))
///     .with(FairFactor::PrimaryLossMagnitude, RiskFactorParameter::triangular(1e6, 5e6, 1e7));
///
/// let losses = run_simulation(&params, 1_000, 42).unwrap();
/// assert_eq!(losses.len(), 1_000);
/// ```
pub fn run_simulation(
    params: &FairParameters,
    trials: usize,
    rng_seed: u64,
) -> Result<LossDistribution, QuantError> {
    let config = QuantConfig::default()
        .with_trials(trials)
        .with_seed(rng_seed);
    SimulationRunner::new(config)
        .run(params)
        .map(|run| run.distribution)
}

fn run_trial(factors: &ResolvedFactors, seed: u64, index: u64) -> f64 {
    let mut rng = RngManager::for_trial(seed, index);

    let tef = factors.threat_event_frequency.sample(&mut rng);
    let vuln = factors.vulnerability.sample(&mut rng);
    let primary = factors.primary_loss_magnitude.sample(&mut rng);
    let secondary = factors.secondary_loss_magnitude.sample(&mut rng);

    let loss_event_frequency = tef * vuln;
    let loss_per_event = primary + secondary;
    loss_event_frequency * loss_per_event
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parameter::RiskFactorParameter;

    fn constant_params() -> FairParameters {
        FairParameters::default()
            .with(
                FairFactor::ThreatEventFrequency,
                RiskFactorParameter::triangular(2.0, 2.0, 2.0),
            )
            .with(
                FairFactor::Vulnerability,
                RiskFactorParameter::triangular(0.5, 0.5, 0.5),
            )
            .with(
                FairFactor::PrimaryLossMagnitude,
                RiskFactorParameter::triangular(100.0, 100.0, 100.0),
            )
            .with(
                FairFactor::SecondaryLossMagnitude,
                RiskFactorParameter::triangular(50.0, 50.0, 50.0),
            )
    }

    #[test]
    fn test_constant_factors_give_exact_product() {
        let losses = run_simulation(&constant_params(), 10, 1).unwrap();
        assert!(losses.losses().iter().all(|&loss| loss == 150.0));
    }

    #[test]
    fn test_empty_distribution_has_no_mean() {
        let losses = run_simulation(&constant_params(), 0, 1).unwrap();
        assert!(losses.is_empty());
        assert_eq!(losses.mean(), None);
    }

    #[test]
    fn test_missing_factor_reported_as_substituted() {
        let mut params = constant_params();
        params.vulnerability = None;

        let run = SimulationRunner::new(QuantConfig::default().with_trials(5))
            .run(&params)
            .unwrap();

        assert_eq!(run.substituted, vec![FairFactor::Vulnerability]);
        assert!(run.distribution.losses().iter().all(|&loss| loss == 0.0));
        assert!(!run.distribution.is_empty());
    }
}
