//! Triangular sampler tests
//!
//! Bounds, shape, degenerate ranges, and validation.

use proptest::prelude::*;
use risk_quant_core_rs::distributions::{sample_triangular, validate_three_point, DistributionKind};
use risk_quant_core_rs::{QuantError, RngManager};

#[test]
fn test_samples_stay_within_bounds() {
    let mut rng = RngManager::new(42);
    for _ in 0..100_000 {
        let x = sample_triangular(1.0, 2.0, 3.0, &mut rng);
        assert!((1.0..=3.0).contains(&x), "sample {} outside [1, 3]", x);
    }
}

#[test]
fn test_sample_mean_matches_triangular_mean() {
    let mut rng = RngManager::new(7);
    let n = 100_000;
    let mean: f64 = (0..n)
        .map(|_| sample_triangular(0.0, 3.0, 10.0, &mut rng))
        .sum::<f64>()
        / n as f64;

    // (min + mode + max) / 3
    let expected = 13.0 / 3.0;
    assert!(
        (mean - expected).abs() < 0.05,
        "mean {} too far from {}",
        mean,
        expected
    );
}

#[test]
fn test_empirical_mode_near_most_likely() {
    let mut rng = RngManager::new(11);
    let mut histogram = [0usize; 10];
    for _ in 0..100_000 {
        let x = sample_triangular(0.0, 3.0, 10.0, &mut rng);
        let bin = (x.floor() as usize).min(9);
        histogram[bin] += 1;
    }

    let peak = histogram
        .iter()
        .enumerate()
        .max_by_key(|(_, count)| **count)
        .map(|(bin, _)| bin)
        .unwrap();

    // Bins [2, 3) and [3, 4) straddle the mode
    assert!(peak == 2 || peak == 3, "peak bin {} not near mode 3", peak);
}

#[test]
fn test_degenerate_range_returns_point_without_drawing() {
    let mut rng = RngManager::new(5);
    let before = rng.get_state();

    assert_eq!(sample_triangular(4.0, 4.0, 4.0, &mut rng), 4.0);
    assert_eq!(rng.get_state(), before);
}

#[test]
fn test_mode_at_edge_is_sampleable() {
    let mut rng = RngManager::new(3);
    for _ in 0..10_000 {
        let low = sample_triangular(0.0, 0.0, 1.0, &mut rng);
        let high = sample_triangular(0.0, 1.0, 1.0, &mut rng);
        assert!((0.0..=1.0).contains(&low));
        assert!((0.0..=1.0).contains(&high));
    }
}

#[test]
fn test_validate_rejects_inverted_bounds() {
    let err = validate_three_point("TEF", 5.0, 2.0, 10.0, &DistributionKind::Triangular).unwrap_err();
    assert!(matches!(err, QuantError::InvalidBounds { ref factor, .. } if factor == "TEF"));

    let err = validate_three_point("TEF", 1.0, 2.0, 0.5, &DistributionKind::Triangular).unwrap_err();
    assert!(matches!(err, QuantError::InvalidBounds { .. }));
}

#[test]
fn test_validate_rejects_non_finite() {
    let err = validate_three_point("Vuln", 0.0, f64::NAN, 1.0, &DistributionKind::Triangular)
        .unwrap_err();
    assert_eq!(
        err,
        QuantError::NonFiniteBound {
            factor: "Vuln".to_string()
        }
    );

    assert!(
        validate_three_point("Vuln", 0.0, 0.5, f64::INFINITY, &DistributionKind::Triangular)
            .is_err()
    );
}

#[test]
fn test_unsupported_distribution_is_configuration_error() {
    let kind = DistributionKind::from("pert".to_string());
    let err = validate_three_point("LM_Primary", 1.0, 2.0, 3.0, &kind).unwrap_err();

    assert!(err.is_configuration());
    assert!(matches!(
        err,
        QuantError::UnsupportedDistribution { ref distribution, .. } if distribution == "pert"
    ));
}

#[test]
fn test_distribution_name_is_case_insensitive() {
    assert_eq!(
        DistributionKind::from("Triangular".to_string()),
        DistributionKind::Triangular
    );
    assert_eq!(
        DistributionKind::from("TRIANGULAR".to_string()),
        DistributionKind::Triangular
    );
}

proptest! {
    #[test]
    fn prop_samples_within_support(
        min in -1.0e6f64..1.0e6,
        width_low in 0.0f64..1.0e6,
        width_high in 0.0f64..1.0e6,
        seed in any::<u64>(),
    ) {
        let mode = min + width_low;
        let max = mode + width_high;
        prop_assert!(validate_three_point("p", min, mode, max, &DistributionKind::Triangular).is_ok());

        let mut rng = RngManager::new(seed);
        for _ in 0..64 {
            let x = sample_triangular(min, mode, max, &mut rng);
            prop_assert!(x >= min && x <= max);
        }
    }
}
