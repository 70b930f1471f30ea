//! Report rendering for the CLI.
//!
//! stdout carries exactly one payload per invocation: a pretty-printed JSON
//! envelope by default, or one line per scanned vector in summary mode.

use crate::outliers::DetectionReport;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Schema version of the JSON envelope.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Supported output formats for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured JSON (default for machine consumption)
    #[default]
    Json,

    /// One-line summary per vector for quick checks
    Summary,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Summary => write!(f, "summary"),
        }
    }
}

/// One scanned vector together with its input.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// Caller-facing name of the vector.
    pub label: String,
    /// Input values; missing entries serialize as `null`.
    pub counts: Vec<Option<f64>>,
    pub report: DetectionReport,
}

impl ScanResult {
    pub fn new(label: impl Into<String>, values: &[f64], report: DetectionReport) -> Self {
        Self {
            label: label.into(),
            counts: values
                .iter()
                .map(|v| if v.is_nan() { None } else { Some(*v) })
                .collect(),
            report,
        }
    }
}

/// Render scan results in the requested format.
pub fn render_scans(
    format: OutputFormat,
    command: &str,
    run_id: &str,
    scans: &[ScanResult],
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => {
            let envelope = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": run_id,
                "command": command,
                "scans": scans,
            });
            serde_json::to_string_pretty(&envelope)
        }
        OutputFormat::Summary => Ok(scans
            .iter()
            .map(summary_line)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// One-line description of a scan.
pub fn summary_line(scan: &ScanResult) -> String {
    let report = &scan.report;
    let found = if report.outliers.is_empty() {
        "no outliers".to_string()
    } else {
        let parts: Vec<String> = report
            .outliers
            .iter()
            .map(|o| format!("{} (p={:.4})", o.index, o.p_value))
            .collect();
        format!("{} outlier(s): {}", report.outliers.len(), parts.join(", "))
    };
    format!(
        "{}: {} [m={}, alpha={}, stop={}]",
        scan.label,
        found,
        report.m,
        report.alpha,
        stop_reason_name(report),
    )
}

fn stop_reason_name(report: &DetectionReport) -> String {
    serde_json::to_value(report.stop_reason)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", report.stop_reason))
}
