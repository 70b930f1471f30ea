//! Monte Carlo concentration test.
//!
//! Null hypothesis: the active mass was spread over the active categories by
//! independent uniform draws. Under that null the category counts follow a
//! multinomial with `total` draws and `m` equiprobable cells. The empirical
//! p-value is the fraction of simulated count vectors whose normalized
//! entropy is no larger than the observed one, so a small p-value means the
//! observed vector is more concentrated than chance allocation explains.
//!
//! The estimate has standard error of order `1/sqrt(trials)`; callers accept
//! that noise rather than retrying.

use crate::counts::CountVector;
use crate::error::{OutlierError, Result};
use lt_math::{normalized_entropy, normalized_entropy_counts, MathError};
use rand::Rng;
use rand_distr::{Binomial, Distribution};

pub use lt_config::policy::DEFAULT_PVALUE_TRIALS;

/// Entropies closer than this are the same value computed in a different
/// summation order and count as ties.
pub const ENTROPY_TIE_TOLERANCE: f64 = 1e-12;

/// Empirical p-value of the active entries of `counts` under uniform
/// multinomial allocation, using the thread-local generator.
pub fn multinomial_pvalue(counts: &CountVector, trials: usize) -> Result<f64> {
    multinomial_pvalue_with_rng(counts, trials, &mut rand::rng())
}

/// Empirical p-value with an explicit random source.
///
/// The draw count is the integral part of the active total.
///
/// # Errors
///
/// - [`OutlierError::InvalidTrials`] if `trials == 0`.
/// - [`MathError::NoActiveCategories`] if no entry is active.
/// - [`MathError::NonPositiveMass`] if the active total is below one draw.
pub fn multinomial_pvalue_with_rng<R: Rng + ?Sized>(
    counts: &CountVector,
    trials: usize,
    rng: &mut R,
) -> Result<f64> {
    if trials == 0 {
        return Err(OutlierError::InvalidTrials);
    }

    let observed = counts.active_values();
    let m = observed.len();
    if m == 0 {
        return Err(MathError::NoActiveCategories.into());
    }

    let total = counts.active_total();
    let draws = total.floor();
    if draws < 1.0 {
        return Err(MathError::NonPositiveMass { total }.into());
    }
    let draws = draws as u64;

    let observed_entropy = normalized_entropy(&observed)?;
    let cutoff = observed_entropy + ENTROPY_TIE_TOLERANCE;

    let mut sample = vec![0u64; m];
    let mut at_most = 0usize;
    for _ in 0..trials {
        sample_uniform_multinomial(draws, &mut sample, rng)?;
        if normalized_entropy_counts(&sample)? <= cutoff {
            at_most += 1;
        }
    }

    let p_value = at_most as f64 / trials as f64;
    tracing::trace!(
        categories = m,
        draws,
        trials,
        observed_entropy,
        p_value,
        "multinomial p-value estimated"
    );
    Ok(p_value)
}

/// Fill `out` with one draw from Multinomial(`draws`, uniform over `out.len()`).
///
/// Uses the conditional-binomial decomposition: cell `i` receives
/// Binomial(remaining, 1 / (cells left)) and the last cell takes the rest,
/// so one sample costs O(m) binomial draws independent of `draws`.
pub fn sample_uniform_multinomial<R: Rng + ?Sized>(
    draws: u64,
    out: &mut [u64],
    rng: &mut R,
) -> Result<()> {
    let m = out.len();
    let mut remaining = draws;
    for (i, slot) in out.iter_mut().enumerate() {
        let cells_left = m - i;
        if cells_left == 1 || remaining == 0 {
            *slot = remaining;
            remaining = 0;
            continue;
        }
        let binomial = Binomial::new(remaining, 1.0 / cells_left as f64)
            .map_err(|e| OutlierError::Sampling(e.to_string()))?;
        let k = binomial.sample(rng);
        *slot = k;
        remaining -= k;
    }
    Ok(())
}
