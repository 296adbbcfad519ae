//! Bounded three-point distributions
//!
//! Risk factors are estimated as (min, most likely, max) ranges. The sampler
//! turns one such range into a single random draw.
//!
//! # Key Principles
//!
//! 1. **Determinism**: draws come from a caller-supplied `RngManager`
//! 2. **Declared capability**: only the triangular shape is implemented;
//!    any other name parses but fails validation
//! 3. **Degenerate ranges**: `min == max` returns `min` without consuming
//!    randomness, so the all-zero default is exactly zero
//!
//! # Example
//!
//! ```
//! use risk_quant_core_rs::distributions::sample_triangular;
//! use risk_quant_core_rs::rng::RngManager;
//!
//! let mut rng = RngManager::new(42);
//! let draw = sample_triangular(1.0, 2.0, 3.0, &mut rng);
//! assert!((1.0..=3.0).contains(&draw));
//! ```

use crate::quant::QuantError;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distribution shape named by a risk factor parameter
///
/// Parsed case-insensitively from any string. Unknown names are kept
/// verbatim so validation can report them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DistributionKind {
    #[default]
    Triangular,
    Unsupported(String),
}

impl From<String> for DistributionKind {
    fn from(name: String) -> Self {
        if name.trim().eq_ignore_ascii_case("triangular") {
            DistributionKind::Triangular
        } else {
            DistributionKind::Unsupported(name)
        }
    }
}

impl From<DistributionKind> for String {
    fn from(kind: DistributionKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributionKind::Triangular => write!(f, "triangular"),
            DistributionKind::Unsupported(name) => write!(f, "{}", name),
        }
    }
}

/// Check that a three-point range can be sampled
///
/// Rejects non-finite bounds, `min > max`, a mode outside `[min, max]`,
/// and any distribution other than triangular.
pub fn validate_three_point(
    factor: &str,
    min: f64,
    most_likely: f64,
    max: f64,
    kind: &DistributionKind,
) -> Result<(), QuantError> {
    if let DistributionKind::Unsupported(name) = kind {
        return Err(QuantError::UnsupportedDistribution {
            factor: factor.to_string(),
            distribution: name.clone(),
        });
    }

    if !(min.is_finite() && most_likely.is_finite() && max.is_finite()) {
        return Err(QuantError::NonFiniteBound {
            factor: factor.to_string(),
        });
    }

    if min > most_likely || most_likely > max {
        return Err(QuantError::InvalidBounds {
            factor: factor.to_string(),
            min,
            most_likely,
            max,
        });
    }

    Ok(())
}

/// Sample from the triangular distribution on `[min, max]` with mode `mode`
///
/// Inverse-CDF method: one uniform draw per sample. Callers must validate
/// the range first; this function does not re-check ordering.
pub fn sample_triangular(min: f64, mode: f64, max: f64, rng: &mut RngManager) -> f64 {
    let span = max - min;
    if span <= 0.0 {
        return min;
    }

    let u = rng.next_f64();
    let mode_cdf = (mode - min) / span;

    let sample = if u < mode_cdf {
        min + (u * span * (mode - min)).sqrt()
    } else {
        max - ((1.0 - u) * span * (max - mode)).sqrt()
    };

    // Rounding can push the last ulp outside the support
    sample.clamp(min, max)
}
