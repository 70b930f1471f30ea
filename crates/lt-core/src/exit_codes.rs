//! Process exit codes of the lt-core binary.
//!
//! Automation reads the outcome from the code alone:
//! - 0 / 1: the scan ran; 1 means at least one outlier was flagged
//! - 10-19: the caller's input or policy must change
//! - 20+: a bug

use crate::error::OutlierError;
use crate::outliers::DetectionReport;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Clean = 0,
    OutliersFound = 1,
    /// Rejected counts or detector parameters.
    ArgsError = 10,
    /// Policy file missing, unreadable or invalid.
    ConfigError = 11,
    InternalError = 20,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Outcome of a completed scan.
    pub fn for_report(report: &DetectionReport) -> Self {
        if report.has_outliers() {
            ExitCode::OutliersFound
        } else {
            ExitCode::Clean
        }
    }

    /// Input problems are the caller's to fix; sampler failures are ours.
    pub fn for_error(err: &OutlierError) -> Self {
        if err.is_input_error() {
            ExitCode::ArgsError
        } else {
            ExitCode::InternalError
        }
    }

    /// Stable identifier used in JSON error envelopes.
    pub fn code_name(self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::OutliersFound => "OK_OUTLIERS",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InternalError => "ERR_INTERNAL",
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
