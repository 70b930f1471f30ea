//! Named detection presets.
//!
//! | preset        | alpha | first test | re-tests |
//! |---------------|-------|------------|----------|
//! | `strict`      | 0.001 | 10000      | 10000    |
//! | `standard`    | 0.01  | 3000       | 2000     |
//! | `exploratory` | 0.05  | 2000       | 2000     |

use crate::policy::{DetectionPolicy, RetestTrials, DEFAULT_PVALUE_TRIALS};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    Strict,
    Standard,
    Exploratory,
}

struct PresetRow {
    name: PresetName,
    aliases: &'static [&'static str],
    description: &'static str,
    /// `None` keeps the default policy's value.
    alpha: Option<f64>,
    trials: Option<usize>,
    retest: Option<RetestTrials>,
}

const PRESETS: &[PresetRow] = &[
    PresetRow {
        name: PresetName::Strict,
        aliases: &["strict", "conservative"],
        description: "Tight FDR level with a large uniform Monte Carlo budget",
        alpha: Some(0.001),
        trials: Some(10_000),
        retest: Some(RetestTrials::Inherit),
    },
    PresetRow {
        name: PresetName::Standard,
        aliases: &["standard", "default"],
        description: "Library defaults: alpha 0.01, 3000 first-test trials",
        alpha: None,
        trials: None,
        retest: None,
    },
    PresetRow {
        name: PresetName::Exploratory,
        aliases: &["exploratory", "explore", "loose"],
        description: "Loose FDR level for noisy interactive triage",
        alpha: Some(0.05),
        trials: Some(DEFAULT_PVALUE_TRIALS),
        retest: Some(RetestTrials::Inherit),
    },
];

impl PresetName {
    pub const ALL: &'static [PresetName] = &[
        PresetName::Strict,
        PresetName::Standard,
        PresetName::Exploratory,
    ];

    fn row(self) -> &'static PresetRow {
        // PRESETS has one row per variant, in ALL order.
        &PRESETS[self as usize]
    }

    /// Canonical (first) name.
    pub fn as_str(self) -> &'static str {
        self.row().aliases[0]
    }

    /// Case-insensitive lookup over canonical names and aliases.
    pub fn parse(s: &str) -> Option<PresetName> {
        PRESETS
            .iter()
            .find(|row| row.aliases.iter().any(|a| a.eq_ignore_ascii_case(s)))
            .map(|row| row.name)
    }

    pub fn description(self) -> &'static str {
        self.row().description
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| PresetError::UnknownPreset(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresetError {
    #[error("Unknown preset '{0}'. Available: strict, standard, exploratory")]
    UnknownPreset(String),
}

/// Full policy for a preset, tagged with `preset:<name>` as its id.
pub fn get_preset(name: PresetName) -> DetectionPolicy {
    let row = name.row();
    let base = DetectionPolicy::default();
    DetectionPolicy {
        policy_id: Some(format!("preset:{}", name)),
        description: Some(row.description.to_string()),
        alpha: row.alpha.unwrap_or(base.alpha),
        trials: row.trials.unwrap_or(base.trials),
        retest: row.retest.unwrap_or(base.retest),
        ..base
    }
}

/// Every preset with its description, in display order.
pub fn list_presets() -> Vec<(PresetName, &'static str)> {
    PresetName::ALL
        .iter()
        .map(|&p| (p, p.description()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_policy;

    #[test]
    fn test_rows_match_variants() {
        for &name in PresetName::ALL {
            assert_eq!(name.row().name, name);
        }
    }

    #[test]
    fn test_all_presets_validate() {
        for &name in PresetName::ALL {
            let policy = get_preset(name);
            validate_policy(&policy).unwrap_or_else(|e| panic!("{} invalid: {}", name, e));
        }
    }

    #[test]
    fn test_strict_is_tighter_than_exploratory() {
        let strict = get_preset(PresetName::Strict);
        let loose = get_preset(PresetName::Exploratory);
        assert!(strict.alpha < loose.alpha);
        assert!(strict.retest_trials() > loose.retest_trials());
    }

    #[test]
    fn test_standard_is_the_default_policy() {
        let standard = get_preset(PresetName::Standard);
        let default = DetectionPolicy::default();
        assert_eq!(standard.alpha, default.alpha);
        assert_eq!(standard.trials, default.trials);
        assert_eq!(standard.retest, default.retest);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(PresetName::parse("loose"), Some(PresetName::Exploratory));
        assert_eq!(PresetName::parse("DEFAULT"), Some(PresetName::Standard));
        assert_eq!(PresetName::parse("nope"), None);
        let err = "nope".parse::<PresetName>().unwrap_err();
        assert!(err.to_string().contains("strict"));
        assert_eq!(PresetName::Exploratory.to_string(), "exploratory");
    }
}
