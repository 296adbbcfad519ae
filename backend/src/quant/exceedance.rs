//! Loss exceedance curve
//!
//! Sorts trial outcomes from largest to smallest and pairs the loss at rank
//! `r` (1-based) with its empirical exceedance probability `r / N`. The
//! result feeds plotting and the report summary; rendering is not done here.

use crate::quant::simulation::LossDistribution;
use crate::quant::QuantError;
use serde::{Deserialize, Serialize};

/// One point on the curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExceedancePoint {
    pub loss: f64,
    pub probability: f64,
}

/// Loss non-increasing, probability non-decreasing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceedanceCurve {
    points: Vec<ExceedancePoint>,
    /// Number of trials the curve was derived from
    trials: usize,
}

/// Build the exceedance curve for a loss distribution
///
/// # Errors
/// `QuantError::NoData` for an empty distribution.
///
/// # Example
/// ```
/// use risk_quant_core_rs::quant::{exceedance_curve, LossDistribution};
///
/// let curve = exceedance_curve(&LossDistribution::new(vec![10.0, 30.0, 20.0, 40.0])).unwrap();
/// assert_eq!(curve.points()[0].loss, 40.0);
/// assert_eq!(curve.points()[0].probability, 0.25);
/// assert_eq!(curve.points()[3].probability, 1.0);
/// ```
pub fn exceedance_curve(distribution: &LossDistribution) -> Result<ExceedanceCurve, QuantError> {
    if distribution.is_empty() {
        return Err(QuantError::NoData);
    }

    let mut sorted = distribution.losses().to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let n = sorted.len() as f64;
    let points = sorted
        .into_iter()
        .enumerate()
        .map(|(index, loss)| ExceedancePoint {
            loss,
            probability: (index + 1) as f64 / n,
        })
        .collect::<Vec<_>>();

    Ok(ExceedanceCurve {
        trials: points.len(),
        points,
    })
}

impl ExceedanceCurve {
    pub fn points(&self) -> &[ExceedancePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Fraction of trials whose loss met or exceeded `threshold`
    pub fn probability_of_exceeding(&self, threshold: f64) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        let count = self.points.partition_point(|point| point.loss >= threshold);
        match count {
            0 => 0.0,
            n => self.points[n - 1].probability,
        }
    }

    /// Smallest loss whose exceedance probability is at least `probability`
    ///
    /// `loss_at_probability(0.05)` is the 1-in-20-year loss. Probabilities
    /// are clamped to `(0, 1]`.
    pub fn loss_at_probability(&self, probability: f64) -> Option<f64> {
        let first = self.points.first()?;
        if probability <= first.probability {
            return Some(first.loss);
        }
        let index = self
            .points
            .partition_point(|point| point.probability < probability.min(1.0));
        self.points
            .get(index)
            .or_else(|| self.points.last())
            .map(|point| point.loss)
    }

    /// `(loss, probability)` pairs, largest loss first
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|point| (point.loss, point.probability))
            .collect()
    }

    /// Evenly thinned copy for plotting
    ///
    /// Always keeps the first and last points, so a `max_points` below 2
    /// yields just those two. Returns a clone when the curve already has
    /// `max_points` (or at most two) points.
    pub fn downsample(&self, max_points: usize) -> ExceedanceCurve {
        let max_points = max_points.max(2);
        if self.points.len() <= max_points {
            return self.clone();
        }

        let last = self.points.len() - 1;
        let step = last as f64 / (max_points - 1) as f64;
        let mut points = Vec::with_capacity(max_points);
        let mut previous = None;

        for i in 0..max_points {
            let index = ((i as f64 * step).round() as usize).min(last);
            if previous != Some(index) {
                points.push(self.points[index]);
                previous = Some(index);
            }
        }

        ExceedanceCurve {
            points,
            trials: self.trials,
        }
    }
}

/// Exceedance curve of raw trial losses as `(loss, probability)` pairs
///
/// # Errors
/// `QuantError::NoData` when `losses` is empty.
pub fn exceedance_pairs(losses: Vec<f64>) -> Result<Vec<(f64, f64)>, QuantError> {
    Ok(exceedance_curve(&LossDistribution::new(losses))?.pairs())
}
