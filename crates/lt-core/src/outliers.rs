//! Sequential outlier removal with Benjamini–Yekutieli FDR control.
//!
//! Each round tests whether the active categories are more concentrated than
//! uniform allocation explains. While the p-value clears the step-up bound
//!
//! `p ≤ α · (k + 1) / (m · c(m))`
//!
//! (k = categories removed so far, m = original length, c(m) the harmonic
//! correction for arbitrary dependence) the largest active category is
//! recorded as an outlier and masked out, and the test is repeated on what
//! remains.
//!
//! `m` is fixed at the original length for the whole run even though the
//! active set shrinks. Re-tests after the first removal use the trial count
//! chosen by [`RetestTrials`], which by default is
//! [`DEFAULT_PVALUE_TRIALS`](crate::pvalue::DEFAULT_PVALUE_TRIALS) rather
//! than the caller's count.

use crate::counts::CountVector;
use crate::error::{OutlierError, Result};
use crate::pvalue::multinomial_pvalue_with_rng;
use lt_config::policy::{DEFAULT_ALPHA, DEFAULT_TRIALS};
use lt_config::{DetectionPolicy, RetestTrials};
use lt_math::harmonic_number;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// One removed category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierRecord {
    /// Position in the original vector.
    pub index: usize,
    /// p-value of the test that triggered the removal.
    pub p_value: f64,
}

/// Diagnostics for one evaluation of the stopping rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationTrace {
    /// Categories removed before this test.
    pub removed: usize,
    /// Trials used for this test's p-value.
    pub trials: usize,
    pub p_value: f64,
    /// Step-up bound the p-value was compared against.
    pub threshold: f64,
    /// Index removed in this round, if the bound was met.
    pub selected: Option<usize>,
}

/// Why the removal loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The latest p-value exceeded its step-up bound.
    ThresholdNotMet,
    /// Every original category was removed.
    AllRemoved,
    /// A single category has no correction constant and is never an outlier.
    SingleCategory,
}

/// Full result of one scan.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub alpha: f64,
    pub trials: usize,
    pub retest_trials: usize,
    /// Original vector length.
    pub m: usize,
    /// Harmonic correction c(m).
    pub correction_factor: f64,
    /// Removed categories, most extreme first.
    pub outliers: Vec<OutlierRecord>,
    pub iterations: Vec<IterationTrace>,
    pub stop_reason: StopReason,
    /// Mask after the scan; `false` marks removed or missing entries.
    pub active_mask: Vec<bool>,
}

impl DetectionReport {
    pub fn has_outliers(&self) -> bool {
        !self.outliers.is_empty()
    }

    /// Indices of the removed categories in removal order.
    pub fn outlier_indices(&self) -> Vec<usize> {
        self.outliers.iter().map(|o| o.index).collect()
    }
}

/// Benjamini–Yekutieli step-up bound after `removed` removals out of `m`.
pub fn by_threshold(alpha: f64, removed: usize, m: usize, correction: f64) -> f64 {
    alpha * (removed + 1) as f64 / (m as f64 * correction)
}

/// Configured sequential outlier detector.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierDetector {
    alpha: f64,
    trials: usize,
    retest: RetestTrials,
    seed: Option<u64>,
}

impl Default for OutlierDetector {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            trials: DEFAULT_TRIALS,
            retest: RetestTrials::Default,
            seed: None,
        }
    }
}

impl OutlierDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector carrying every knob of `policy`.
    pub fn from_policy(policy: &DetectionPolicy) -> Self {
        Self {
            alpha: policy.alpha,
            trials: policy.trials,
            retest: policy.retest,
            seed: policy.seed,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Trials for the first test of each scan.
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_retest(mut self, retest: RetestTrials) -> Self {
        self.retest = retest;
        self
    }

    /// Use a seeded [`StdRng`] instead of the thread-local generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn retest(&self) -> RetestTrials {
        self.retest
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(OutlierError::InvalidAlpha { alpha: self.alpha });
        }
        if self.trials == 0 || self.retest.resolve(self.trials) == 0 {
            return Err(OutlierError::InvalidTrials);
        }
        Ok(())
    }

    /// Scan raw values (NaN = missing) with this detector's random source.
    pub fn detect_values(&self, values: &[f64]) -> Result<DetectionReport> {
        let mut counts = CountVector::new(values.to_vec())?;
        self.detect(&mut counts)
    }

    /// Scan `counts`, masking removed categories in place.
    pub fn detect(&self, counts: &mut CountVector) -> Result<DetectionReport> {
        match self.seed {
            Some(seed) => self.detect_with_rng(counts, &mut StdRng::seed_from_u64(seed)),
            None => self.detect_with_rng(counts, &mut rand::rng()),
        }
    }

    /// Scan `counts` drawing every Monte Carlo sample from `rng`.
    pub fn detect_with_rng<R: Rng + ?Sized>(
        &self,
        counts: &mut CountVector,
        rng: &mut R,
    ) -> Result<DetectionReport> {
        self.validate()?;

        let m = counts.len();
        let correction = harmonic_number(m as u64);
        let retest_trials = self.retest.resolve(self.trials);

        tracing::debug!(
            event = "outliers.start",
            m,
            active = counts.active_count(),
            alpha = self.alpha,
            trials = self.trials,
            retest_trials,
            correction,
            "outlier scan started"
        );

        let mut p_value = multinomial_pvalue_with_rng(counts, self.trials, rng)?;
        let mut trials_used = self.trials;
        let mut removed = 0usize;
        let mut outliers = Vec::new();
        let mut iterations = Vec::new();

        let stop_reason = if correction <= 0.0 {
            iterations.push(IterationTrace {
                removed,
                trials: trials_used,
                p_value,
                threshold: 0.0,
                selected: None,
            });
            StopReason::SingleCategory
        } else {
            loop {
                let threshold = by_threshold(self.alpha, removed, m, correction);
                let selected = if p_value <= threshold {
                    counts.argmax_active()
                } else {
                    None
                };
                iterations.push(IterationTrace {
                    removed,
                    trials: trials_used,
                    p_value,
                    threshold,
                    selected,
                });

                let Some(index) = selected else {
                    break StopReason::ThresholdNotMet;
                };

                let value = counts.get(index);
                outliers.push(OutlierRecord { index, p_value });
                counts.deactivate(index);
                removed += 1;
                tracing::debug!(
                    event = "outliers.removed",
                    index,
                    value = ?value,
                    p_value,
                    threshold,
                    removed,
                    "outlier removed"
                );

                if removed >= m {
                    break StopReason::AllRemoved;
                }

                trials_used = retest_trials;
                p_value = multinomial_pvalue_with_rng(counts, trials_used, rng)?;
            }
        };

        tracing::debug!(
            event = "outliers.done",
            outliers = outliers.len(),
            stop_reason = ?stop_reason,
            "outlier scan finished"
        );

        Ok(DetectionReport {
            alpha: self.alpha,
            trials: self.trials,
            retest_trials,
            m,
            correction_factor: correction,
            outliers,
            iterations,
            stop_reason,
            active_mask: counts.active_mask().to_vec(),
        })
    }
}

/// Indices of significant outliers in `values` with their p-values.
///
/// `values` may contain NaN for missing entries. `trials` applies to the
/// first test only; re-tests use the default trial count.
pub fn outliers(values: &[f64], alpha: f64, trials: usize) -> Result<Vec<OutlierRecord>> {
    OutlierDetector::new()
        .with_alpha(alpha)
        .with_trials(trials)
        .detect_values(values)
        .map(|report| report.outliers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lt_math::MathError;

    fn seeded(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn threshold_matches_step_up_formula() {
        let c = harmonic_number(5);
        let t0 = by_threshold(0.01, 0, 5, c);
        let t1 = by_threshold(0.01, 1, 5, c);
        assert!((t0 - 0.01 / (5.0 * c)).abs() < 1e-15);
        assert!((t1 - 2.0 * t0).abs() < 1e-15);
    }

    #[test]
    fn flags_dominant_category() {
        let mut v = CountVector::from_counts(&[1000, 8, 8, 1, 0]).unwrap();
        let report = OutlierDetector::new()
            .with_trials(10_000)
            .detect_with_rng(&mut v, &mut seeded(1))
            .unwrap();

        assert_eq!(report.outliers.first().map(|o| o.index), Some(0));
        assert!(report.outliers[0].p_value < 0.001);
        assert!(report.outliers.len() < 5);
        assert!(!report.active_mask[0]);
        assert!(!v.is_active(0));
        assert_eq!(report.m, 5);
    }

    #[test]
    fn uniform_vector_yields_nothing() {
        let report = OutlierDetector::new()
            .with_trials(2000)
            .detect_with_rng(
                &mut CountVector::from_counts(&[1, 1, 1, 1]).unwrap(),
                &mut seeded(2),
            )
            .unwrap();
        assert!(report.outliers.is_empty());
        assert_eq!(report.stop_reason, StopReason::ThresholdNotMet);
        assert_eq!(report.iterations.len(), 1);
        assert_eq!(report.active_mask, vec![true; 4]);
    }

    #[test]
    fn zero_mass_fails_fast() {
        let err = OutlierDetector::new()
            .detect_with_rng(
                &mut CountVector::from_counts(&[0, 0]).unwrap(),
                &mut seeded(3),
            )
            .unwrap_err();
        assert!(matches!(err, OutlierError::Math(MathError::NonPositiveMass { .. })));
    }

    #[test]
    fn single_category_is_never_an_outlier() {
        let report = OutlierDetector::new()
            .detect_with_rng(&mut CountVector::from_counts(&[42]).unwrap(), &mut seeded(4))
            .unwrap();
        assert!(report.outliers.is_empty());
        assert_eq!(report.stop_reason, StopReason::SingleCategory);
        assert_eq!(report.correction_factor, 0.0);
    }

    #[test]
    fn retest_on_exhausted_mass_is_fatal() {
        // Removing the only non-zero entry leaves zeros to re-test.
        let err = OutlierDetector::new()
            .detect_with_rng(
                &mut CountVector::from_counts(&[1000, 0, 0, 0, 0]).unwrap(),
                &mut seeded(5),
            )
            .unwrap_err();
        assert!(matches!(err, OutlierError::Math(MathError::NonPositiveMass { .. })));
    }

    #[test]
    fn first_test_uses_caller_trials_and_retests_use_default() {
        let report = OutlierDetector::new()
            .with_trials(5000)
            .detect_with_rng(
                &mut CountVector::from_counts(&[1000, 8, 8, 1, 0]).unwrap(),
                &mut seeded(6),
            )
            .unwrap();
        assert_eq!(report.iterations[0].trials, 5000);
        assert_eq!(report.retest_trials, 2000);
        for trace in &report.iterations[1..] {
            assert_eq!(trace.trials, 2000);
        }
    }

    #[test]
    fn inherit_retest_reuses_caller_trials() {
        let report = OutlierDetector::new()
            .with_trials(700)
            .with_retest(RetestTrials::Inherit)
            .detect_with_rng(
                &mut CountVector::from_counts(&[1000, 8, 8, 1, 0]).unwrap(),
                &mut seeded(7),
            )
            .unwrap();
        assert!(report.iterations.len() >= 2);
        assert!(report.iterations.iter().all(|t| t.trials == 700));
    }

    #[test]
    fn removed_indices_are_unique_and_bounded() {
        let report = OutlierDetector::new()
            .with_alpha(0.2)
            .detect_with_rng(
                &mut CountVector::from_counts(&[5000, 3000, 900, 40, 3, 2, 1]).unwrap(),
                &mut seeded(8),
            )
            .unwrap();
        let mut seen = std::collections::HashSet::new();
        for (k, trace) in report.iterations.iter().enumerate() {
            assert_eq!(trace.removed, k);
        }
        for record in &report.outliers {
            assert!(seen.insert(record.index), "index {} removed twice", record.index);
            assert!(!report.active_mask[record.index]);
        }
        assert!(report.outliers.len() <= report.m);
    }

    #[test]
    fn missing_entries_are_never_selected() {
        let mut v = CountVector::new(vec![f64::NAN, 1000.0, 3.0, 2.0, 1.0]).unwrap();
        let report = OutlierDetector::new()
            .detect_with_rng(&mut v, &mut seeded(9))
            .unwrap();
        assert_eq!(report.outliers.first().map(|o| o.index), Some(1));
        assert!(report.outliers.iter().all(|o| o.index != 0));
        assert_eq!(report.m, 5);
    }

    #[test]
    fn invalid_parameters_rejected() {
        let mut v = CountVector::from_counts(&[3, 1]).unwrap();
        assert!(matches!(
            OutlierDetector::new().with_alpha(0.0).detect_with_rng(&mut v, &mut seeded(10)),
            Err(OutlierError::InvalidAlpha { .. })
        ));
        assert!(matches!(
            OutlierDetector::new().with_alpha(1.0).detect_with_rng(&mut v, &mut seeded(10)),
            Err(OutlierError::InvalidAlpha { .. })
        ));
        assert!(matches!(
            OutlierDetector::new().with_trials(0).detect_with_rng(&mut v, &mut seeded(10)),
            Err(OutlierError::InvalidTrials)
        ));
        assert!(matches!(
            OutlierDetector::new()
                .with_retest(RetestTrials::Fixed(0))
                .detect_with_rng(&mut v, &mut seeded(10)),
            Err(OutlierError::InvalidTrials)
        ));
    }

    #[test]
    fn seeded_detector_is_reproducible() {
        let detector = OutlierDetector::new().with_seed(99).with_trials(1000);
        let a = detector.detect_values(&[300.0, 20.0, 18.0, 25.0]).unwrap();
        let b = detector.detect_values(&[300.0, 20.0, 18.0, 25.0]).unwrap();
        assert_eq!(a.outliers, b.outliers);
        assert_eq!(a.iterations, b.iterations);
    }

    #[test]
    fn from_policy_copies_knobs() {
        let policy = DetectionPolicy {
            alpha: 0.05,
            trials: 123,
            retest: RetestTrials::Fixed(77),
            seed: Some(5),
            ..DetectionPolicy::default()
        };
        let d = OutlierDetector::from_policy(&policy);
        assert_eq!(d.alpha(), 0.05);
        assert_eq!(d.trials(), 123);
        assert_eq!(d.retest(), RetestTrials::Fixed(77));
        assert_eq!(d.seed(), Some(5));
    }

    #[test]
    fn convenience_entry_point() {
        let found = outliers(&[1000.0, 8.0, 8.0, 1.0, 0.0], 0.01, 3000).unwrap();
        assert_eq!(found.first().map(|o| o.index), Some(0));
        assert!(outliers(&[0.0, 0.0], 0.01, 3000).is_err());
    }
}
