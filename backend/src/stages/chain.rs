//! Analysis chain
//!
//! The ordered steps the orchestrator runs once the scenario is scoped.
//! Each step runs exactly once per analysis turn, in order.

use crate::core::config::QuantConfig;
use crate::stages::{LossExceedanceStage, QuantitativeRiskStage, StageHandler};

#[derive(Default)]
pub struct AnalysisChain {
    steps: Vec<Box<dyn StageHandler>>,
}

impl AnalysisChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full pipeline with the built-in numeric stages in place
    ///
    /// ```text
    /// vulnerability intelligence → factor estimation → simulation
    ///     → loss exceedance → report authoring → feedback
    /// ```
    pub fn standard(
        vulnerability_intelligence: Box<dyn StageHandler>,
        factor_estimation: Box<dyn StageHandler>,
        report_authoring: Box<dyn StageHandler>,
        feedback: Box<dyn StageHandler>,
        config: QuantConfig,
    ) -> Self {
        let curve_points = config.curve_points;
        Self::new()
            .then(vulnerability_intelligence)
            .then(factor_estimation)
            .then(Box::new(QuantitativeRiskStage::new(config)))
            .then(Box::new(LossExceedanceStage::new(curve_points)))
            .then(report_authoring)
            .then(feedback)
    }

    pub fn then(mut self, step: Box<dyn StageHandler>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[Box<dyn StageHandler>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl std::fmt::Debug for AnalysisChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|step| step.name()))
            .finish()
    }
}
