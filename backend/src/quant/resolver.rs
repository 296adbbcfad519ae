//! Parameter resolution
//!
//! Turns one risk factor (flat or composite) into a scalar sample. Flat
//! parameters delegate to the triangular sampler; composites resolve every
//! component recursively and sum the draws.

use crate::distributions::{sample_triangular, validate_three_point};
use crate::models::parameter::{FairFactor, FairParameters, RiskFactorParameter};
use crate::quant::QuantError;
use crate::rng::RngManager;

impl RiskFactorParameter {
    /// Validate every flat leaf
    ///
    /// `name` is used in error messages; composite components are reported
    /// as `parent.component`.
    pub fn validate(&self, name: &str) -> Result<(), QuantError> {
        match self {
            RiskFactorParameter::Flat(flat) => validate_three_point(
                name,
                flat.min,
                flat.most_likely,
                flat.max,
                &flat.distribution,
            ),
            RiskFactorParameter::Composite(components) => {
                for (component, param) in components {
                    param.validate(&format!("{}.{}", name, component))?;
                }
                Ok(())
            }
        }
    }

    /// Draw one sample without validating
    ///
    /// Only call after `validate` succeeded.
    pub fn sample(&self, rng: &mut RngManager) -> f64 {
        match self {
            RiskFactorParameter::Flat(flat) => {
                sample_triangular(flat.min, flat.most_likely, flat.max, rng)
            }
            RiskFactorParameter::Composite(components) => {
                components.values().map(|param| param.sample(rng)).sum()
            }
        }
    }

    /// Smallest and largest value a sample can take
    ///
    /// For composites this is the sum of the component supports.
    pub fn support(&self) -> (f64, f64) {
        match self {
            RiskFactorParameter::Flat(flat) => (flat.min, flat.max),
            RiskFactorParameter::Composite(components) => {
                components.values().fold((0.0, 0.0), |(lo, hi), param| {
                    let (p_lo, p_hi) = param.support();
                    (lo + p_lo, hi + p_hi)
                })
            }
        }
    }
}

/// Validate then draw one sample of a named factor
///
/// # Errors
/// Returns a configuration error for an unsupported distribution, inverted
/// bounds, or a non-finite bound anywhere in the parameter tree.
///
/// # Example
/// ```
/// use risk_quant_core_rs::models::RiskFactorParameter;
/// use risk_quant_core_rs::quant::resolve_sample;
/// use risk_quant_core_rs::rng::RngManager;
///
/// let param = RiskFactorParameter::composite([
///     ("legal", RiskFactorParameter::triangular(0.0, 0.0, 0.0)),
///     ("remediation", RiskFactorParameter::triangular(5.0, 5.0, 5.0)),
/// ]);
/// let mut rng = RngManager::new(1);
/// assert_eq!(resolve_sample("LM_Primary", &param, &mut rng).unwrap(), 5.0);
/// ```
pub fn resolve_sample(
    name: &str,
    param: &RiskFactorParameter,
    rng: &mut RngManager,
) -> Result<f64, QuantError> {
    param.validate(name)?;
    Ok(param.sample(rng))
}

/// The four FAIR factors, validated and with absent factors zero-filled
#[derive(Debug, Clone)]
pub struct ResolvedFactors {
    pub threat_event_frequency: RiskFactorParameter,
    pub vulnerability: RiskFactorParameter,
    pub primary_loss_magnitude: RiskFactorParameter,
    pub secondary_loss_magnitude: RiskFactorParameter,
    /// Factors that were absent and replaced by the zero parameter
    pub substituted: Vec<FairFactor>,
}

impl ResolvedFactors {
    pub fn resolve(params: &FairParameters) -> Result<Self, QuantError> {
        let resolved = ResolvedFactors {
            threat_event_frequency: params.factor_or_zero(FairFactor::ThreatEventFrequency),
            vulnerability: params.factor_or_zero(FairFactor::Vulnerability),
            primary_loss_magnitude: params.factor_or_zero(FairFactor::PrimaryLossMagnitude),
            secondary_loss_magnitude: params.factor_or_zero(FairFactor::SecondaryLossMagnitude),
            substituted: params.missing_factors(),
        };

        for factor in FairFactor::ALL {
            resolved.get(factor).validate(factor.key())?;
        }

        Ok(resolved)
    }

    pub fn get(&self, factor: FairFactor) -> &RiskFactorParameter {
        match factor {
            FairFactor::ThreatEventFrequency => &self.threat_event_frequency,
            FairFactor::Vulnerability => &self.vulnerability,
            FairFactor::PrimaryLossMagnitude => &self.primary_loss_magnitude,
            FairFactor::SecondaryLossMagnitude => &self.secondary_loss_magnitude,
        }
    }
}
