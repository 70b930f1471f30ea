//! Detection policy types.
//!
//! A policy fixes the knobs of one outlier scan: the FDR level, the Monte
//! Carlo budget of the first test, and how many trials every later re-test
//! gets.

use crate::validate::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default false-discovery rate level.
pub const DEFAULT_ALPHA: f64 = 0.01;

/// Default trial count for the first p-value of a scan.
pub const DEFAULT_TRIALS: usize = 3000;

/// Trial count of a bare p-value estimate, and of every re-test under
/// [`RetestTrials::Default`].
pub const DEFAULT_PVALUE_TRIALS: usize = 2000;

/// How many Monte Carlo trials the re-tests after the first removal use.
///
/// The historical behavior only honors the caller's trial count for the very
/// first test and falls back to [`DEFAULT_PVALUE_TRIALS`] afterwards. That is
/// kept as the default; `Inherit` and `Fixed` make the budget explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetestTrials {
    /// Re-test with [`DEFAULT_PVALUE_TRIALS`] regardless of the caller's count.
    #[default]
    Default,
    /// Re-test with the same count as the first test.
    Inherit,
    /// Re-test with a fixed count.
    Fixed(usize),
}

impl RetestTrials {
    /// Trial count for re-tests given the count used by the first test.
    pub fn resolve(self, first_trials: usize) -> usize {
        match self {
            RetestTrials::Default => DEFAULT_PVALUE_TRIALS,
            RetestTrials::Inherit => first_trials,
            RetestTrials::Fixed(n) => n,
        }
    }
}

impl std::str::FromStr for RetestTrials {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" | "compat" => Ok(RetestTrials::Default),
            "inherit" | "same" => Ok(RetestTrials::Inherit),
            other => other
                .parse::<usize>()
                .map(RetestTrials::Fixed)
                .map_err(|_| format!("unknown retest mode: {}", s)),
        }
    }
}

impl fmt::Display for RetestTrials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetestTrials::Default => write!(f, "default"),
            RetestTrials::Inherit => write!(f, "inherit"),
            RetestTrials::Fixed(n) => write!(f, "{}", n),
        }
    }
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

fn default_trials() -> usize {
    DEFAULT_TRIALS
}

/// Complete detection policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionPolicy {
    pub schema_version: String,

    #[serde(default)]
    pub policy_id: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Target FDR level in (0, 1).
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Trials for the first p-value estimate.
    #[serde(default = "default_trials")]
    pub trials: usize,

    #[serde(default)]
    pub retest: RetestTrials,

    /// Fixed RNG seed for reproducible scans.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl Default for DetectionPolicy {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            policy_id: None,
            description: None,
            alpha: DEFAULT_ALPHA,
            trials: DEFAULT_TRIALS,
            retest: RetestTrials::Default,
            seed: None,
            notes: None,
        }
    }
}

impl DetectionPolicy {
    /// Load a policy from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_json(&content)
    }

    /// Parse a policy from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Trial count the re-tests of this policy will use.
    pub fn retest_trials(&self) -> usize {
        self.retest.resolve(self.trials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = DetectionPolicy::default();
        assert_eq!(policy.alpha, 0.01);
        assert_eq!(policy.trials, 3000);
        assert_eq!(policy.retest, RetestTrials::Default);
        assert_eq!(policy.retest_trials(), 2000);
    }

    #[test]
    fn test_minimal_json_fills_defaults() {
        let policy = DetectionPolicy::parse_json(r#"{"schema_version": "1.0.0"}"#).unwrap();
        assert_eq!(policy, DetectionPolicy::default());
    }

    #[test]
    fn test_retest_serde_forms() {
        let p = DetectionPolicy::parse_json(
            r#"{"schema_version": "1.0.0", "retest": "inherit", "trials": 500}"#,
        )
        .unwrap();
        assert_eq!(p.retest, RetestTrials::Inherit);
        assert_eq!(p.retest_trials(), 500);

        let json = r#"{"schema_version": "1.0.0", "retest": {"fixed": 750}}"#;
        let p = DetectionPolicy::parse_json(json).unwrap();
        assert_eq!(p.retest, RetestTrials::Fixed(750));
        assert_eq!(p.retest_trials(), 750);
    }

    #[test]
    fn test_retest_parse() {
        assert_eq!("default".parse::<RetestTrials>().unwrap(), RetestTrials::Default);
        assert_eq!("INHERIT".parse::<RetestTrials>().unwrap(), RetestTrials::Inherit);
        assert_eq!("1234".parse::<RetestTrials>().unwrap(), RetestTrials::Fixed(1234));
        assert!("sometimes".parse::<RetestTrials>().is_err());
    }

    #[test]
    fn test_retest_display_round_trips() {
        for mode in [RetestTrials::Default, RetestTrials::Inherit, RetestTrials::Fixed(9)] {
            assert_eq!(mode.to_string().parse::<RetestTrials>().unwrap(), mode);
        }
    }

    #[test]
    fn test_parse_error() {
        let err = DetectionPolicy::parse_json("{not json").unwrap_err();
        assert!(matches!(err, ValidationError::ParseError(_)));
    }
}
