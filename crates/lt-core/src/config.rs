//! Policy loading for lt-core.
//!
//! Resolution order: explicit preset > policy file (CLI > env > XDG > system)
//! > built-in defaults. The loaded policy is always semantically validated.

pub use lt_config::preset::{get_preset, list_presets, PresetName};
pub use lt_config::resolve::ConfigSource;
pub use lt_config::{DetectionPolicy, RetestTrials, ValidationError};

use lt_config::resolve::resolve_policy_path;
use lt_config::validate::validate_policy;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during policy loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Policy file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid policy {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error("Invalid built-in policy: {0}")]
    Builtin(#[from] ValidationError),
}

/// Policy loading options.
#[derive(Debug, Default, Clone)]
pub struct ConfigOptions {
    /// Explicit policy file path (must exist when given).
    pub policy_path: Option<PathBuf>,
    /// Named preset; bypasses file resolution.
    pub preset: Option<PresetName>,
}

/// Loaded policy with provenance information.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedPolicy {
    pub policy: DetectionPolicy,
    /// Path the policy was read from (None for presets and defaults).
    pub path: Option<PathBuf>,
    /// Human-readable origin ("CLI argument", "preset:strict", ...).
    pub source: String,
}

/// Load and validate the detection policy.
pub fn load_policy(options: &ConfigOptions) -> Result<LoadedPolicy, ConfigError> {
    if let Some(preset) = options.preset {
        let policy = get_preset(preset);
        validate_policy(&policy)?;
        return Ok(LoadedPolicy {
            policy,
            path: None,
            source: format!("preset:{}", preset),
        });
    }

    if let Some(path) = options.policy_path.as_deref() {
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
    }

    let resolved = resolve_policy_path(options.policy_path.as_deref());
    match resolved.path {
        Some(path) => {
            let policy = read_policy(&path)?;
            Ok(LoadedPolicy {
                policy,
                path: Some(path),
                source: resolved.source.to_string(),
            })
        }
        None => {
            let policy = DetectionPolicy::default();
            validate_policy(&policy)?;
            Ok(LoadedPolicy {
                policy,
                path: None,
                source: ConfigSource::BuiltinDefault.to_string(),
            })
        }
    }
}

/// Read and validate a single policy file.
pub fn read_policy(path: &Path) -> Result<DetectionPolicy, ConfigError> {
    let invalid = |source| ConfigError::Invalid {
        path: path.to_path_buf(),
        source,
    };
    let policy = DetectionPolicy::from_file(path).map_err(invalid)?;
    validate_policy(&policy).map_err(invalid)?;
    Ok(policy)
}
