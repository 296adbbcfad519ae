//! Quantitative risk stage
//!
//! Reads `fair_parameters`, runs the Monte Carlo simulation, and writes
//! `simulation_results`.

use crate::core::config::QuantConfig;
use crate::models::parameter::{FairEstimate, FairFactor};
use crate::models::state::{slots, SessionState};
use crate::quant::{LossDistribution, LossSummary, QuantError, SimulationRunner};
use crate::stages::{HandlerOutcome, StageError, StageHandler};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Contents of the `simulation_results` slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    pub trials: usize,
    pub rng_seed: u64,
    /// Factors that were absent from the estimate and sampled as zero
    #[serde(default)]
    pub substituted_factors: Vec<FairFactor>,
    /// `None` when the run produced no trials
    pub summary: Option<LossSummary>,
    pub losses: LossDistribution,
}

impl SimulationResults {
    pub fn from_value(value: &Value) -> Result<Self, QuantError> {
        serde_json::from_value(value.clone())
            .map_err(|e| QuantError::InvalidParameters(format!("simulation results: {}", e)))
    }
}

/// Built-in handler wrapping `SimulationRunner`
#[derive(Debug, Clone, Default)]
pub struct QuantitativeRiskStage {
    runner: SimulationRunner,
}

impl QuantitativeRiskStage {
    pub fn new(config: QuantConfig) -> Self {
        Self {
            runner: SimulationRunner::new(config),
        }
    }
}

impl StageHandler for QuantitativeRiskStage {
    fn name(&self) -> &str {
        "quantitative_risk_engine"
    }

    fn output_slot(&self) -> &str {
        slots::SIMULATION_RESULTS
    }

    fn run(&self, state: &SessionState) -> Result<HandlerOutcome, StageError> {
        let Some(raw) = state.populated_slot(slots::FAIR_PARAMETERS) else {
            return Ok(HandlerOutcome::awaiting(
                "FAIR parameters are not available; the simulation was not run.",
            ));
        };

        let estimate = FairEstimate::from_value(raw)?;
        let run = self.runner.run(&estimate.parameters)?;

        let summary = if run.distribution.is_empty() {
            None
        } else {
            Some(LossSummary::from_distribution(&run.distribution)?)
        };

        let mut message = match &summary {
            Some(s) => format!(
                "Ran {} trials. Annualized loss expectancy: ${:.0}; 1-in-20-year loss: ${:.0}.",
                s.trials, s.mean, s.p95
            ),
            None => "Trial count is zero; no loss distribution was produced.".to_string(),
        };
        if !run.substituted.is_empty() {
            let names: Vec<&str> = run.substituted.iter().map(|f| f.key()).collect();
            message.push_str(&format!(
                " Missing factors sampled as zero: {}. Results under-estimate risk.",
                names.join(", ")
            ));
        }

        let results = SimulationResults {
            trials: run.distribution.len(),
            rng_seed: run.rng_seed,
            substituted_factors: run.substituted,
            summary,
            losses: run.distribution,
        };

        let output = serde_json::to_value(&results)
            .map_err(|e| StageError::failed(self.name(), e.to_string()))?;

        Ok(HandlerOutcome::completed(output).with_message(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn state_with_parameters(params: Value) -> SessionState {
        let mut stored = BTreeMap::new();
        stored.insert(slots::FAIR_PARAMETERS.to_string(), params);
        SessionState::restore(uuid::Uuid::new_v4(), None, stored)
    }

    #[test]
    fn test_missing_parameters_waits() {
        let stage = QuantitativeRiskStage::default();
        let outcome = stage.run(&SessionState::new()).unwrap();
        assert!(matches!(outcome, HandlerOutcome::AwaitingInput { .. }));
    }

    #[test]
    fn test_unsupported_distribution_is_configuration_error() {
        let state = state_with_parameters(json!({
            "TEF": {"min": 1, "most_likely": 2, "max": 3, "distribution": "pert"}
        }));
        let err = QuantitativeRiskStage::default().run(&state).unwrap_err();
        assert!(matches!(
            err,
            StageError::Configuration(QuantError::UnsupportedDistribution { .. })
        ));
    }

    #[test]
    fn test_results_record_substituted_factors() {
        let state = state_with_parameters(json!({
            "justification": "only frequency was estimable",
            "parameters": {"TEF": {"min": 1, "most_likely": 2, "max": 3}}
        }));
        let stage = QuantitativeRiskStage::new(QuantConfig::default().with_trials(100));

        let HandlerOutcome::Completed { output, messages } = stage.run(&state).unwrap() else {
            panic!("expected completion");
        };
        let results = SimulationResults::from_value(&output).unwrap();

        assert_eq!(results.trials, 100);
        assert_eq!(results.substituted_factors.len(), 3);
        assert!(messages[0].contains("under-estimate"));
    }
}
