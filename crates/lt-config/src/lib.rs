//! Leak Triage configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for policy.json
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Semantic validation
//! - Named presets for common significance levels

pub mod policy;
pub mod preset;
pub mod resolve;
pub mod validate;

pub use policy::{DetectionPolicy, RetestTrials};
pub use preset::{get_preset, list_presets, PresetError, PresetName};
pub use resolve::{resolve_policy_path, ConfigSource, PolicyPath};
pub use validate::{validate_policy, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
