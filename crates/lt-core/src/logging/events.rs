//! Structured event names and correlation context.

use serde::{Deserialize, Serialize};

/// Processing stages of one lt-core invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Input parsing and validation.
    Input,
    /// Monte Carlo testing and removal.
    Detect,
    /// Result emission.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Input => "input",
            Stage::Detect => "detect",
            Stage::Report => "report",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Detect stage
    pub const DETECT_STARTED: &str = "detect.started";
    pub const DETECT_FINISHED: &str = "detect.finished";

    // Config/init events
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    // Error events
    pub const INPUT_ERROR: &str = "input_error";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Correlation fields shared by every event of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogContext {
    /// Unique ID for this invocation of lt-core.
    pub run_id: String,
    /// Label of the scanned vector when the caller names it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_label: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            vector_label: None,
        }
    }

    pub fn with_vector_label(mut self, label: impl Into<String>) -> Self {
        self.vector_label = Some(label.into());
        self
    }
}
