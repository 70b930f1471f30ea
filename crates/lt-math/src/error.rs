//! Precondition failures for the numerical kernels.

use thiserror::Error;

/// Result type alias for lt-math operations.
pub type Result<T> = std::result::Result<T, MathError>;

/// Errors raised when an input violates a kernel's precondition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    #[error("empty input vector")]
    EmptyInput,

    #[error("no active (non-missing) categories")]
    NoActiveCategories,

    #[error("total mass must be positive, got {total}")]
    NonPositiveMass { total: f64 },
}
