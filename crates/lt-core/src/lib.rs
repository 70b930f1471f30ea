//! Leak Triage Core Library
//!
//! Finds the allocation sites that hold a disproportionate share of leaked
//! memory:
//! - Count vectors with missing entries masked out
//! - Monte Carlo concentration test against uniform allocation
//! - Sequential outlier removal under Benjamini–Yekutieli FDR control
//! - Policy loading, structured logging and CLI exit codes
//!
//! The binary entry point is in `main.rs`.

pub mod config;
pub mod counts;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod outliers;
pub mod output;
pub mod pvalue;

pub use counts::CountVector;
pub use error::{OutlierError, Result};
pub use outliers::{
    by_threshold, outliers, DetectionReport, IterationTrace, OutlierDetector, OutlierRecord,
    StopReason,
};
pub use pvalue::{multinomial_pvalue, multinomial_pvalue_with_rng, DEFAULT_PVALUE_TRIALS};
