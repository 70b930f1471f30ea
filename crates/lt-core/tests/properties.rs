//! Property-based tests for the tester and the remover.
//!
//! Case counts stay low: every case runs a full Monte Carlo estimate.

use lt_core::{by_threshold, multinomial_pvalue_with_rng, CountVector, OutlierDetector};
use lt_math::harmonic_number;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn positive_counts() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..5_000, 1..12).prop_filter("needs mass", |v| {
        v.iter().sum::<u64>() >= 1
    })
}

/// Every entry holds mass, so re-tests never run out of draws.
fn strictly_positive_counts() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1u64..5_000, 1..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The estimate is a probability.
    #[test]
    fn pvalue_in_unit_interval(values in positive_counts(), seed in any::<u64>()) {
        let v = CountVector::from_counts(&values).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let p = multinomial_pvalue_with_rng(&v, 200, &mut rng).unwrap();
        prop_assert!((0.0..=1.0).contains(&p));
    }

    /// Permuting the categories does not change the observed statistic, so a
    /// shared seed gives the same estimate.
    #[test]
    fn pvalue_ignores_category_order(values in positive_counts(), seed in any::<u64>()) {
        let mut reversed = values.clone();
        reversed.reverse();
        let a = multinomial_pvalue_with_rng(
            &CountVector::from_counts(&values).unwrap(),
            150,
            &mut StdRng::seed_from_u64(seed),
        )
        .unwrap();
        let b = multinomial_pvalue_with_rng(
            &CountVector::from_counts(&reversed).unwrap(),
            150,
            &mut StdRng::seed_from_u64(seed),
        )
        .unwrap();
        prop_assert!((a - b).abs() < 1e-12, "a={} b={}", a, b);
    }

    /// Removal never repeats an index, never exceeds m, and the recorded
    /// thresholds follow the step-up formula.
    #[test]
    fn removal_invariants(
        values in strictly_positive_counts(),
        seed in any::<u64>(),
        alpha in 0.001f64..0.5
    ) {
        let mut v = CountVector::from_counts(&values).unwrap();
        let report = OutlierDetector::new()
            .with_alpha(alpha)
            .with_trials(150)
            .with_retest(lt_config::RetestTrials::Inherit)
            .detect_with_rng(&mut v, &mut StdRng::seed_from_u64(seed))
            .unwrap();

        let m = values.len();
        prop_assert_eq!(report.m, m);
        prop_assert!(report.outliers.len() <= m);

        let mut seen = std::collections::HashSet::new();
        for record in &report.outliers {
            prop_assert!(record.index < m);
            prop_assert!(seen.insert(record.index));
            prop_assert!(!v.is_active(record.index));
        }

        let c = harmonic_number(m as u64);
        for trace in &report.iterations {
            if c > 0.0 {
                let expected = by_threshold(alpha, trace.removed, m, c);
                prop_assert!((trace.threshold - expected).abs() < 1e-15);
                prop_assert_eq!(trace.selected.is_some(), trace.p_value <= trace.threshold);
            }
        }
    }
}
