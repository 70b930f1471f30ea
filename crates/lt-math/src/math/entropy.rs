//! Normalized Shannon entropy of count vectors.
//!
//! For active counts `c_1, ..., c_m` with total `n = Σ c_i` the raw entropy is
//!
//! `H = -Σ (c_i / n) · ln(c_i / n)`
//!
//! and the normalized value is `H / ln(m)`, which lies in [0, 1]:
//! - 0: all mass sits in one category
//! - 1: mass is spread uniformly over every active category
//!
//! Missing entries (NaN) are skipped entirely: they count neither towards `m`
//! nor towards `n`. A single active category has no distribution to be
//! non-uniform about and returns 1 by convention, which also sidesteps the
//! `ln(1) = 0` denominator.

use crate::error::{MathError, Result};

/// `x · ln(x)` with the convention `0 · ln(0) = 0`.
#[inline]
pub fn xlogx(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x * x.ln()
    }
}

/// Normalized entropy of a real-valued count vector.
///
/// NaN entries are treated as missing.
///
/// # Errors
///
/// - [`MathError::EmptyInput`] if `values` is empty.
/// - [`MathError::NoActiveCategories`] if every entry is missing.
/// - [`MathError::NonPositiveMass`] if two or more entries are active and
///   their sum is not positive.
///
/// # Examples
///
/// ```
/// use lt_math::normalized_entropy;
///
/// assert_eq!(normalized_entropy(&[42.0]).unwrap(), 1.0);
/// assert!(normalized_entropy(&[10.0, 0.0, 0.0]).unwrap().abs() < 1e-12);
/// assert!((normalized_entropy(&[5.0, 5.0, f64::NAN]).unwrap() - 1.0).abs() < 1e-12);
/// ```
pub fn normalized_entropy(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::EmptyInput);
    }
    entropy_of(|| values.iter().copied().filter(|v| !v.is_nan()))
}

/// Normalized entropy of an integer count vector (no missing entries).
///
/// Shares the arithmetic of [`normalized_entropy`] exactly, so an integer
/// vector and its `f64` image produce bit-identical results.
pub fn normalized_entropy_counts(counts: &[u64]) -> Result<f64> {
    if counts.is_empty() {
        return Err(MathError::EmptyInput);
    }
    entropy_of(|| counts.iter().map(|&c| c as f64))
}

fn entropy_of<I, F>(active: F) -> Result<f64>
where
    F: Fn() -> I,
    I: Iterator<Item = f64>,
{
    let m = active().count();
    match m {
        0 => return Err(MathError::NoActiveCategories),
        1 => return Ok(1.0),
        _ => {}
    }

    let total: f64 = active().sum();
    if total <= 0.0 {
        return Err(MathError::NonPositiveMass { total });
    }

    let h = -active().map(|v| xlogx(v / total)).sum::<f64>();
    Ok(h / (m as f64).ln())
}
