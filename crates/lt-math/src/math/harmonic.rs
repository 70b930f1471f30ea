//! Harmonic numbers for the Benjamini–Yekutieli correction.
//!
//! The value returned here is `H(n) - 1 = 1/2 + 1/3 + ... + 1/n`, i.e. the
//! harmonic number without its leading term. Small `n` are summed exactly;
//! from [`EXACT_HARMONIC_LIMIT`] on the asymptotic expansion
//!
//! `H(n) ≈ γ + ln(n) + 1/(2n) - 1/(12n²) + 1/(120n⁴)`
//!
//! is used (minus the same leading 1), whose truncation error at n = 100 is
//! below 1e-14.

/// Euler–Mascheroni constant γ.
#[allow(clippy::excessive_precision)]
pub const EULER_MASCHERONI: f64 = 0.577_215_664_901_532_860_606_512_090_082;

/// Below this `n` the sum is computed term by term.
pub const EXACT_HARMONIC_LIMIT: u64 = 100;

/// `H(n) - 1`, exact below [`EXACT_HARMONIC_LIMIT`], asymptotic above.
///
/// Returns 0 for `n <= 1`.
///
/// # Examples
///
/// ```
/// use lt_math::harmonic_number;
///
/// assert_eq!(harmonic_number(1), 0.0);
/// assert!((harmonic_number(2) - 0.5).abs() < 1e-15);
/// assert!((harmonic_number(4) - (0.5 + 1.0 / 3.0 + 0.25)).abs() < 1e-15);
/// ```
pub fn harmonic_number(n: u64) -> f64 {
    if n < EXACT_HARMONIC_LIMIT {
        return (2..=n).map(|d| 1.0 / d as f64).sum();
    }
    let n = n as f64;
    let n2 = n * n;
    EULER_MASCHERONI + n.ln() + 0.5 / n - 1.0 / (12.0 * n2) + 1.0 / (120.0 * n2 * n2) - 1.0
}
