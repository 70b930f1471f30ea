//! Logging configuration.
//!
//! Sources, lowest precedence first:
//! - built-in default (`info`, human format)
//! - `LT_LOG` (a level) and `LT_LOG_FORMAT` (`human` or `jsonl`)
//! - the CLI's `-v` / `-q` flags
//!
//! `RUST_LOG`, when set, is handed to `EnvFilter` untouched and overrides
//! the level computed here.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing_subscriber::filter::LevelFilter;

pub const ENV_LOG_LEVEL: &str = "LT_LOG";
pub const ENV_LOG_FORMAT: &str = "LT_LOG_FORMAT";

/// Log output format. Both formats write to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per event.
    Jsonl,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("human") || s.eq_ignore_ascii_case("text") {
            Ok(LogFormat::Human)
        } else if s.eq_ignore_ascii_case("jsonl") || s.eq_ignore_ascii_case("json") {
            Ok(LogFormat::Jsonl)
        } else {
            Err(format!("unknown log format '{}' (expected human or jsonl)", s))
        }
    }
}

/// Verbosity requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// `-q`: errors only.
    Quiet,
    /// No flag: defer to the environment.
    #[default]
    Normal,
    /// `-v` repeated n times.
    Verbose(u8),
}

impl Verbosity {
    /// `-q` wins over any number of `-v`.
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, 0) => Verbosity::Normal,
            (false, n) => Verbosity::Verbose(n),
        }
    }

    /// Level forced by the flags, if any.
    pub fn level(self) -> Option<LevelFilter> {
        match self {
            Verbosity::Quiet => Some(LevelFilter::ERROR),
            Verbosity::Normal => None,
            Verbosity::Verbose(1) => Some(LevelFilter::DEBUG),
            Verbosity::Verbose(_) => Some(LevelFilter::TRACE),
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LevelFilter,
    /// Prefix human-format lines with a timestamp.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LevelFilter::INFO,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Resolve from the process environment and CLI verbosity.
    pub fn from_env(verbosity: Verbosity) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), verbosity)
    }

    /// Resolve with an arbitrary variable lookup. Unparseable values are
    /// ignored rather than fatal: logging must never block a scan.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, verbosity: Verbosity) -> Self {
        let mut config = LogConfig::default();

        if let Some(level) = lookup(ENV_LOG_LEVEL).and_then(|v| v.trim().parse().ok()) {
            config.level = level;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT).and_then(|v| v.trim().parse().ok()) {
            config.format = format;
        }
        if let Some(level) = verbosity.level() {
            config.level = level;
        }

        config
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Jsonl);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(Verbosity::from_flags(3, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(0, false).level(), None);
        assert_eq!(Verbosity::from_flags(1, false).level(), Some(LevelFilter::DEBUG));
        assert_eq!(Verbosity::from_flags(2, false).level(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_env_values_applied() {
        let config = LogConfig::from_lookup(
            lookup(&[("LT_LOG", "warn"), ("LT_LOG_FORMAT", "jsonl")]),
            Verbosity::Normal,
        );
        assert_eq!(config.level, LevelFilter::WARN);
        assert_eq!(config.format, LogFormat::Jsonl);
    }

    #[test]
    fn test_garbage_env_ignored() {
        let config = LogConfig::from_lookup(
            lookup(&[("LT_LOG", "loud"), ("LT_LOG_FORMAT", "xml")]),
            Verbosity::Normal,
        );
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_flags_beat_env() {
        let config = LogConfig::from_lookup(lookup(&[("LT_LOG", "off")]), Verbosity::Verbose(1));
        assert_eq!(config.level, LevelFilter::DEBUG);
    }

    #[test]
    fn test_builder() {
        let config = LogConfig::default()
            .with_format(LogFormat::Jsonl)
            .with_level(LevelFilter::OFF)
            .with_timestamps(false);
        assert_eq!(config.format, LogFormat::Jsonl);
        assert_eq!(config.level, LevelFilter::OFF);
        assert!(!config.timestamps);
    }
}
