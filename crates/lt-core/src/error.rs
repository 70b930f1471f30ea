//! Error types for outlier detection.
//!
//! Every variant is a precondition failure: the call is aborted and nothing
//! is retried. A scan that finds no outliers is not an error.

use lt_math::MathError;
use thiserror::Error;

/// Result type alias for lt-core operations.
pub type Result<T> = std::result::Result<T, OutlierError>;

/// Errors raised by the tester and the remover.
#[derive(Debug, Error)]
pub enum OutlierError {
    #[error(transparent)]
    Math(#[from] MathError),

    #[error("count at index {index} must be finite and non-negative, got {value}")]
    InvalidCount { index: usize, value: f64 },

    #[error("alpha must be in (0, 1), got {alpha}")]
    InvalidAlpha { alpha: f64 },

    #[error("trial count must be at least 1")]
    InvalidTrials,

    #[error("multinomial sampling failed: {0}")]
    Sampling(String),
}

impl OutlierError {
    /// Whether the error stems from the caller's input rather than the sampler.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, OutlierError::Sampling(_))
    }
}
