//! Structured logging for lt-core.
//!
//! stdout belongs to the report payload, so every event goes to stderr,
//! either as human-readable lines or as JSON objects.
//!
//! ```ignore
//! use lt_core::logging::{init_logging, generate_run_id, LogConfig, LogContext, Verbosity};
//!
//! init_logging(&LogConfig::from_env(Verbosity::Normal));
//! let ctx = LogContext::new(generate_run_id());
//! log_event!(ctx, INFO, event_names::RUN_STARTED, Stage::Init, "scan starting");
//! ```

pub mod config;
pub mod events;

pub use config::{LogConfig, LogFormat, Verbosity};
pub use events::{event_names, LogContext, Stage};

use std::io::IsTerminal;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Call once, before the first event.
///
/// A `RUST_LOG` filter, when present and valid, replaces `config.level`.
/// A second call is a no-op.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(Directive::from(config.level)));

    let ansi = std::io::stderr().is_terminal();
    let registry = tracing_subscriber::registry().with(filter);

    // Err only means a subscriber is already installed; keep that one.
    let _ = match (config.format, config.timestamps) {
        (LogFormat::Jsonl, _) => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        (LogFormat::Human, true) => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(ansi),
            )
            .try_init(),
        (LogFormat::Human, false) => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(ansi)
                    .without_time(),
            )
            .try_init(),
    };
}

/// Fresh correlation id: `run-` plus 12 hex digits.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    // first 12 hex chars
    format!("run-{}", &uuid.simple().to_string()[..12])
}

/// Structured event logging with correlation context.
///
/// Usage:
/// ```ignore
/// log_event!(ctx, INFO, event_names::DETECT_FINISHED, Stage::Detect, "Scan complete",
///     outliers = 2);
/// ```
#[macro_export]
macro_rules! log_event {
    ($ctx:expr, INFO, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::info!(
            target: $event,
            run_id = %$ctx.run_id,
            vector_label = ?$ctx.vector_label,
            stage = %$stage,
            message = $msg,
            $($key = $val,)*
        )
    };
    ($ctx:expr, DEBUG, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::debug!(
            target: $event,
            run_id = %$ctx.run_id,
            vector_label = ?$ctx.vector_label,
            stage = %$stage,
            message = $msg,
            $($key = $val,)*
        )
    };
    ($ctx:expr, WARN, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::warn!(
            target: $event,
            run_id = %$ctx.run_id,
            vector_label = ?$ctx.vector_label,
            stage = %$stage,
            message = $msg,
            $($key = $val,)*
        )
    };
    ($ctx:expr, ERROR, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::error!(
            target: $event,
            run_id = %$ctx.run_id,
            vector_label = ?$ctx.vector_label,
            stage = %$stage,
            message = $msg,
            $($key = $val,)*
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_run_id() {
        let id1 = generate_run_id();
        let id2 = generate_run_id();

        assert!(id1.starts_with("run-"));
        assert_ne!(id1, id2);
        // Format: run-<12 hex chars>
        assert_eq!(id1.len(), 16);
        assert!(id1[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = LogConfig::default().with_level(tracing_subscriber::filter::LevelFilter::OFF);
        init_logging(&config);
        init_logging(&config.with_format(LogFormat::Jsonl));
    }

    #[test]
    fn test_log_event_macro_compiles_without_subscriber() {
        let ctx = LogContext::new("run-test");
        crate::log_event!(
            ctx,
            DEBUG,
            event_names::DETECT_STARTED,
            Stage::Detect,
            "no subscriber installed",
            m = 5usize
        );
    }
}
