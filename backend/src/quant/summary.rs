//! Headline statistics for the report step

use crate::quant::exceedance::{exceedance_curve, ExceedanceCurve};
use crate::quant::simulation::LossDistribution;
use crate::quant::QuantError;
use serde::{Deserialize, Serialize};

/// Summary of one loss distribution
///
/// `mean` is the annualized loss expectancy (ALE). Percentiles use the
/// nearest-rank rule on the exceedance curve, so `p95` is the loss
/// exceeded in 5% of simulated years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossSummary {
    pub trials: usize,
    pub mean: f64,
    pub median: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    pub min: f64,
    pub max: f64,
    /// Fraction of trials with no loss at all
    pub zero_loss_fraction: f64,
}

impl LossSummary {
    /// # Errors
    /// `QuantError::NoData` for an empty distribution.
    pub fn from_distribution(distribution: &LossDistribution) -> Result<Self, QuantError> {
        let curve = exceedance_curve(distribution)?;
        Self::from_curve(distribution, &curve)
    }

    /// Summary reusing an already computed curve
    pub fn from_curve(
        distribution: &LossDistribution,
        curve: &ExceedanceCurve,
    ) -> Result<Self, QuantError> {
        let mean = distribution.mean().ok_or(QuantError::NoData)?;
        let quantile = |exceed: f64| curve.loss_at_probability(exceed).ok_or(QuantError::NoData);

        let points = curve.points();
        let max = points.first().map(|p| p.loss).ok_or(QuantError::NoData)?;
        let min = points.last().map(|p| p.loss).ok_or(QuantError::NoData)?;
        let zeros = distribution.losses().iter().filter(|&&loss| loss == 0.0).count();

        Ok(LossSummary {
            trials: distribution.len(),
            mean,
            median: quantile(0.5)?,
            p90: quantile(0.10)?,
            p95: quantile(0.05)?,
            p99: quantile(0.01)?,
            min,
            max,
            zero_loss_fraction: zeros as f64 / distribution.len() as f64,
        })
    }
}
