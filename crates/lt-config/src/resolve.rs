//! Policy file discovery.
//!
//! Candidates are probed in a fixed order and the first existing file wins:
//!
//! 1. the path given on the command line
//! 2. `$LEAK_TRIAGE_POLICY`
//! 3. `$LEAK_TRIAGE_CONFIG_DIR/policy.json`
//! 4. `<user config dir>/leak-triage/policy.json`
//! 5. `/etc/leak-triage/policy.json`
//!
//! When none exists the built-in default policy applies. A candidate that
//! does not exist is skipped silently, including an explicit CLI path;
//! callers that require the CLI path to exist check it themselves.

use std::fmt;
use std::path::{Path, PathBuf};

pub const ENV_POLICY_PATH: &str = "LEAK_TRIAGE_POLICY";
pub const ENV_CONFIG_DIR: &str = "LEAK_TRIAGE_CONFIG_DIR";
pub const POLICY_FILENAME: &str = "policy.json";

const APP_DIR: &str = "leak-triage";

/// Where the effective policy came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    CliArgument,
    /// `LEAK_TRIAGE_POLICY` or `LEAK_TRIAGE_CONFIG_DIR`.
    Environment,
    XdgConfig,
    SystemConfig,
    #[default]
    BuiltinDefault,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfigSource::CliArgument => "CLI argument",
            ConfigSource::Environment => "environment variable",
            ConfigSource::XdgConfig => "XDG config",
            ConfigSource::SystemConfig => "system config",
            ConfigSource::BuiltinDefault => "builtin default",
        })
    }
}

/// Outcome of discovery; `path` is `None` for the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyPath {
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Discover the policy file using the process environment.
pub fn resolve_policy_path(cli_path: Option<&Path>) -> PolicyPath {
    resolve_with(cli_path, |key| std::env::var_os(key).map(PathBuf::from))
}

/// Discover the policy file with an explicit environment lookup.
pub fn resolve_with(
    cli_path: Option<&Path>,
    env: impl Fn(&str) -> Option<PathBuf>,
) -> PolicyPath {
    candidates(cli_path, env)
        .into_iter()
        .find(|(path, _)| path.is_file())
        .map(|(path, source)| PolicyPath {
            path: Some(path),
            source,
        })
        .unwrap_or_default()
}

/// Every location that would be probed, in priority order.
pub fn candidates(
    cli_path: Option<&Path>,
    env: impl Fn(&str) -> Option<PathBuf>,
) -> Vec<(PathBuf, ConfigSource)> {
    let mut out = Vec::with_capacity(5);
    if let Some(path) = cli_path {
        out.push((path.to_path_buf(), ConfigSource::CliArgument));
    }
    if let Some(path) = env(ENV_POLICY_PATH) {
        out.push((path, ConfigSource::Environment));
    }
    if let Some(dir) = env(ENV_CONFIG_DIR) {
        out.push((dir.join(POLICY_FILENAME), ConfigSource::Environment));
    }
    if let Some(dir) = xdg_config_dir() {
        out.push((dir.join(POLICY_FILENAME), ConfigSource::XdgConfig));
    }
    out.push((
        system_config_dir().join(POLICY_FILENAME),
        ConfigSource::SystemConfig,
    ));
    out
}

/// Per-user directory, e.g. `~/.config/leak-triage`.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR))
}

pub fn system_config_dir() -> PathBuf {
    Path::new("/etc").join(APP_DIR)
}
