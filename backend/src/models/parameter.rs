//! Risk factor parameters
//!
//! A risk factor is either a single three-point estimate or a named
//! breakdown of sub-factors whose samples are summed (for example a loss
//! magnitude split into legal, remediation, and reputational costs).
//!
//! # JSON shape
//!
//! ```json
//! {
//!     "TEF": {"min": 1, "most_likely": 2, "max": 3, "distribution": "triangular"},
//!     "Vuln": {"min": 0.1, "most_likely": 0.3, "max": 0.5},
//!     "LM_Primary": {
//!         "legal": {"min": 1e5, "most_likely": 5e5, "max": 1e6},
//!         "remediation": {"min": 2e5, "most_likely": 4e5, "max": 9e5}
//!     },
//!     "LM_Secondary": {"min": 5e5, "most_likely": 1.5e6, "max": 3e6}
//! }
//! ```
//!
//! The flat/composite decision is made structurally by serde: an object
//! carrying `min`, `most_likely`, and `max` is flat, anything else must be a
//! map of nested parameters.

use crate::distributions::DistributionKind;
use crate::quant::QuantError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Single three-point estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatParameter {
    pub min: f64,
    pub most_likely: f64,
    pub max: f64,
    #[serde(default)]
    pub distribution: DistributionKind,
}

impl FlatParameter {
    pub fn triangular(min: f64, most_likely: f64, max: f64) -> Self {
        Self {
            min,
            most_likely,
            max,
            distribution: DistributionKind::Triangular,
        }
    }
}

/// One random input to the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RiskFactorParameter {
    Flat(FlatParameter),
    /// Components are sampled independently and summed. `BTreeMap` keeps
    /// the sampling order stable for a given seed.
    Composite(BTreeMap<String, RiskFactorParameter>),
}

impl RiskFactorParameter {
    /// Flat triangular parameter
    pub fn triangular(min: f64, most_likely: f64, max: f64) -> Self {
        RiskFactorParameter::Flat(FlatParameter::triangular(min, most_likely, max))
    }

    /// Degenerate parameter that always samples to zero
    ///
    /// Substituted for a missing top-level factor.
    pub fn zero() -> Self {
        Self::triangular(0.0, 0.0, 0.0)
    }

    /// Composite parameter from `(name, component)` pairs
    pub fn composite<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = (S, RiskFactorParameter)>,
        S: Into<String>,
    {
        RiskFactorParameter::Composite(
            components
                .into_iter()
                .map(|(name, param)| (name.into(), param))
                .collect(),
        )
    }
}

/// The four FAIR factors the simulation combines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FairFactor {
    #[serde(rename = "TEF")]
    ThreatEventFrequency,
    #[serde(rename = "Vuln")]
    Vulnerability,
    #[serde(rename = "LM_Primary")]
    PrimaryLossMagnitude,
    #[serde(rename = "LM_Secondary")]
    SecondaryLossMagnitude,
}

impl FairFactor {
    pub const ALL: [FairFactor; 4] = [
        FairFactor::ThreatEventFrequency,
        FairFactor::Vulnerability,
        FairFactor::PrimaryLossMagnitude,
        FairFactor::SecondaryLossMagnitude,
    ];

    /// Key used in the parameter JSON
    pub fn key(&self) -> &'static str {
        match self {
            FairFactor::ThreatEventFrequency => "TEF",
            FairFactor::Vulnerability => "Vuln",
            FairFactor::PrimaryLossMagnitude => "LM_Primary",
            FairFactor::SecondaryLossMagnitude => "LM_Secondary",
        }
    }
}

impl fmt::Display for FairFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Complete set of simulation inputs
///
/// Any factor may be absent; see `FairParameters::factor_or_zero`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FairParameters {
    #[serde(rename = "TEF", default, skip_serializing_if = "Option::is_none")]
    pub threat_event_frequency: Option<RiskFactorParameter>,

    #[serde(rename = "Vuln", default, skip_serializing_if = "Option::is_none")]
    pub vulnerability: Option<RiskFactorParameter>,

    #[serde(rename = "LM_Primary", default, skip_serializing_if = "Option::is_none")]
    pub primary_loss_magnitude: Option<RiskFactorParameter>,

    #[serde(rename = "LM_Secondary", default, skip_serializing_if = "Option::is_none")]
    pub secondary_loss_magnitude: Option<RiskFactorParameter>,
}

impl FairParameters {
    pub fn get(&self, factor: FairFactor) -> Option<&RiskFactorParameter> {
        match factor {
            FairFactor::ThreatEventFrequency => self.threat_event_frequency.as_ref(),
            FairFactor::Vulnerability => self.vulnerability.as_ref(),
            FairFactor::PrimaryLossMagnitude => self.primary_loss_magnitude.as_ref(),
            FairFactor::SecondaryLossMagnitude => self.secondary_loss_magnitude.as_ref(),
        }
    }

    pub fn set(&mut self, factor: FairFactor, param: RiskFactorParameter) {
        let slot = match factor {
            FairFactor::ThreatEventFrequency => &mut self.threat_event_frequency,
            FairFactor::Vulnerability => &mut self.vulnerability,
            FairFactor::PrimaryLossMagnitude => &mut self.primary_loss_magnitude,
            FairFactor::SecondaryLossMagnitude => &mut self.secondary_loss_magnitude,
        };
        *slot = Some(param);
    }

    /// Builder-style `set`
    pub fn with(mut self, factor: FairFactor, param: RiskFactorParameter) -> Self {
        self.set(factor, param);
        self
    }

    /// Factors not supplied by the estimate
    pub fn missing_factors(&self) -> Vec<FairFactor> {
        FairFactor::ALL
            .into_iter()
            .filter(|factor| self.get(*factor).is_none())
            .collect()
    }

    /// Supplied parameter, or the zero parameter when absent
    ///
    /// An incomplete estimate still produces a defined (under-estimated)
    /// result rather than failing.
    pub fn factor_or_zero(&self, factor: FairFactor) -> RiskFactorParameter {
        self.get(factor)
            .cloned()
            .unwrap_or_else(RiskFactorParameter::zero)
    }

    /// Parse from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, QuantError> {
        FairEstimate::from_json_str(json).map(|estimate| estimate.parameters)
    }
}

/// Output of the factor estimation step
///
/// The estimation step either writes the parameter map directly or wraps it
/// as `{"justification": "...", "parameters": {...}}`. Both are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FairEstimate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    pub parameters: FairParameters,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EstimateEnvelope {
    Wrapped {
        parameters: FairParameters,
        #[serde(default)]
        justification: Option<String>,
    },
    Bare(FairParameters),
}

impl FairEstimate {
    /// Parse a slot value
    ///
    /// String values are treated as JSON text, optionally inside a
    /// fenced code block.
    pub fn from_value(value: &Value) -> Result<Self, QuantError> {
        match value {
            Value::String(text) => Self::from_json_str(text),
            other => Self::from_envelope(
                serde_json::from_value(other.clone())
                    .map_err(|e| QuantError::InvalidParameters(e.to_string()))?,
            ),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, QuantError> {
        let envelope: EstimateEnvelope = serde_json::from_str(strip_code_fence(json))
            .map_err(|e| QuantError::InvalidParameters(e.to_string()))?;
        Self::from_envelope(envelope)
    }

    fn from_envelope(envelope: EstimateEnvelope) -> Result<Self, QuantError> {
        let estimate = match envelope {
            EstimateEnvelope::Wrapped {
                parameters,
                justification,
            } => FairEstimate {
                justification,
                parameters,
            },
            EstimateEnvelope::Bare(parameters) => FairEstimate {
                justification: None,
                parameters,
            },
        };

        if estimate.parameters.missing_factors().len() == FairFactor::ALL.len() {
            return Err(QuantError::InvalidParameters(
                "no FAIR factors (TEF, Vuln, LM_Primary, LM_Secondary) found".to_string(),
            ));
        }

        Ok(estimate)
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}
