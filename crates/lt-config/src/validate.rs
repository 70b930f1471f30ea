//! Configuration validation errors and semantic validation.

use crate::policy::{DetectionPolicy, RetestTrials};
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate a detection policy semantically.
pub fn validate_policy(policy: &DetectionPolicy) -> ValidationResult<()> {
    if policy.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: policy.schema_version.clone(),
        });
    }

    validate_alpha("alpha", policy.alpha)?;
    validate_trials("trials", policy.trials)?;

    if let RetestTrials::Fixed(n) = policy.retest {
        validate_trials("retest.fixed", n)?;
    }

    Ok(())
}

/// Alpha must lie strictly inside (0, 1).
pub fn validate_alpha(field: &str, alpha: f64) -> ValidationResult<()> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be in (0, 1), got {}", alpha),
        });
    }
    Ok(())
}

/// Trial counts must be positive.
pub fn validate_trials(field: &str, trials: usize) -> ValidationResult<()> {
    if trials == 0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: "Must be at least 1".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_valid() {
        validate_policy(&DetectionPolicy::default()).unwrap();
    }

    #[test]
    fn test_alpha_bounds() {
        for bad in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let policy = DetectionPolicy {
                alpha: bad,
                ..DetectionPolicy::default()
            };
            let err = validate_policy(&policy).unwrap_err();
            assert!(matches!(
                err,
                ValidationError::InvalidValue { ref field, .. } if field == "alpha"
            ));
            assert_eq!(err.code(), 65);
        }
    }

    #[test]
    fn test_zero_trials_rejected() {
        let policy = DetectionPolicy {
            trials: 0,
            ..DetectionPolicy::default()
        };
        assert!(validate_policy(&policy).is_err());

        let policy = DetectionPolicy {
            retest: RetestTrials::Fixed(0),
            ..DetectionPolicy::default()
        };
        let err = validate_policy(&policy).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidValue { ref field, .. } if field == "retest.fixed"
        ));
    }

    #[test]
    fn test_version_mismatch() {
        let policy = DetectionPolicy {
            schema_version: "0.9.0".to_string(),
            ..DetectionPolicy::default()
        };
        assert!(matches!(
            validate_policy(&policy),
            Err(ValidationError::VersionMismatch { .. })
        ));
    }
}
