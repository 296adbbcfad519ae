//! Loss exceedance stage
//!
//! Reads `simulation_results` and writes a plot-ready exceedance curve to
//! `loss_exceedance_curve` for the report step to render.

use crate::core::config::DEFAULT_CURVE_POINTS;
use crate::models::state::{slots, SessionState};
use crate::quant::{exceedance_curve, QuantError};
use crate::stages::quantitative::SimulationResults;
use crate::stages::{HandlerOutcome, StageError, StageHandler};

#[derive(Debug, Clone)]
pub struct LossExceedanceStage {
    max_points: usize,
}

impl LossExceedanceStage {
    pub fn new(max_points: usize) -> Self {
        Self { max_points }
    }
}

impl Default for LossExceedanceStage {
    fn default() -> Self {
        Self::new(DEFAULT_CURVE_POINTS)
    }
}

impl StageHandler for LossExceedanceStage {
    fn name(&self) -> &str {
        "loss_exceedance"
    }

    fn output_slot(&self) -> &str {
        slots::LOSS_EXCEEDANCE_CURVE
    }

    fn run(&self, state: &SessionState) -> Result<HandlerOutcome, StageError> {
        let Some(raw) = state.populated_slot(slots::SIMULATION_RESULTS) else {
            return Ok(HandlerOutcome::awaiting(
                "No simulation results to plot.",
            ));
        };

        let results = SimulationResults::from_value(raw)?;
        let curve = match exceedance_curve(&results.losses) {
            Ok(curve) => curve,
            Err(QuantError::NoData) => {
                return Ok(HandlerOutcome::awaiting("No simulation results to plot."));
            }
            Err(other) => return Err(other.into()),
        };

        let thinned = match self.max_points {
            0 => curve.clone(),
            max_points => curve.downsample(max_points),
        };
        let output = serde_json::to_value(&thinned)
            .map_err(|e| StageError::failed(self.name(), e.to_string()))?;

        Ok(HandlerOutcome::completed(output).with_message(format!(
            "Loss exceedance curve derived from {} trials ({} plot points).",
            curve.trials(),
            thinned.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quant::{ExceedanceCurve, LossDistribution};
    use std::collections::BTreeMap;

    fn state_with_losses(losses: Vec<f64>) -> SessionState {
        let results = SimulationResults {
            trials: losses.len(),
            rng_seed: 1,
            substituted_factors: Vec::new(),
            summary: None,
            losses: LossDistribution::new(losses),
        };
        let mut stored = BTreeMap::new();
        stored.insert(
            slots::SIMULATION_RESULTS.to_string(),
            serde_json::to_value(results).unwrap(),
        );
        SessionState::restore(uuid::Uuid::new_v4(), None, stored)
    }

    #[test]
    fn test_empty_losses_do_not_complete() {
        let outcome = LossExceedanceStage::default()
            .run(&state_with_losses(Vec::new()))
            .unwrap();
        assert!(matches!(outcome, HandlerOutcome::AwaitingInput { .. }));
    }

    #[test]
    fn test_curve_is_downsampled() {
        let losses = (0..1000).map(|i| i as f64).collect();
        let outcome = LossExceedanceStage::new(50)
            .run(&state_with_losses(losses))
            .unwrap();

        let HandlerOutcome::Completed { output, .. } = outcome else {
            panic!("expected completion");
        };
        let curve: ExceedanceCurve = serde_json::from_value(output).unwrap();
        assert_eq!(curve.len(), 50);
        assert_eq!(curve.trials(), 1000);
    }

    #[test]
    fn test_zero_curve_points_keeps_every_trial() {
        let losses = (0..300).map(|i| i as f64).collect();
        let outcome = LossExceedanceStage::new(0)
            .run(&state_with_losses(losses))
            .unwrap();

        let HandlerOutcome::Completed { output, .. } = outcome else {
            panic!("expected completion");
        };
        let curve: ExceedanceCurve = serde_json::from_value(output).unwrap();
        assert_eq!(curve.len(), 300);
    }
}
