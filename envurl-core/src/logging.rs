//! Logging setup for envurl.
//!
//! The library only emits `tracing` events. A subscriber is installed by
//! [`init`] when the `tracing-subscriber` feature is enabled and one of the
//! environment variables below asks for output.
//!
//! # Environment Variables
//!
//! - `ENVURL_DEBUG` - any true-ish value (`1`, `true`, `yes`, `on`) enables debug output
//! - `ENVURL_LOG_LEVEL=trace|debug|info|warn|error` - explicit level
//! - `ENVURL_LOG_FORMAT=json|pretty|compact` - output format (default: compact)
//!
//! ```rust,no_run
//! use envurl_core::logging;
//!
//! logging::init();
//! ```

use std::env;
use std::sync::Once;

use crate::config::is_true;

/// Enables debug output.
pub const DEBUG_VAR: &str = "ENVURL_DEBUG";
/// Selects the log level.
pub const LEVEL_VAR: &str = "ENVURL_LOG_LEVEL";
/// Selects the output format.
pub const FORMAT_VAR: &str = "ENVURL_LOG_FORMAT";

/// Crates whose events are enabled by the filter.
const TARGETS: [&str; 4] = ["envurl", "envurl_core", "envurl_env", "envurl_cli"];

static INIT: Once = Once::new();

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Multi-line human output.
    Pretty,
    /// Single-line human output.
    Compact,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to compact.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::Compact,
        }
    }
}

/// Check if `ENVURL_DEBUG` is set to a true-ish value.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR).is_ok_and(|v| is_true(&v))
}

/// Resolve the level from the raw variable values.
///
/// An explicit valid level wins; otherwise debug mode selects `debug` and the
/// default is `warn`.
pub fn resolve_level(level: Option<&str>, debug: bool) -> &'static str {
    let explicit = level.and_then(|l| match l.to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    });
    match explicit {
        Some(level) => level,
        None if debug => "debug",
        None => "warn",
    }
}

/// The configured log level.
pub fn log_level() -> &'static str {
    resolve_level(env::var(LEVEL_VAR).ok().as_deref(), is_debug_enabled())
}

/// The configured log format.
pub fn log_format() -> LogFormat {
    env::var(FORMAT_VAR)
        .map(|f| LogFormat::from_name(&f))
        .unwrap_or(LogFormat::Compact)
}

/// Build the filter directive for a level, e.g. `envurl=debug,envurl_core=debug,...`.
pub fn filter_directive(level: &str) -> String {
    TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the subscriber if logging was requested. Later calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var(LEVEL_VAR).is_err() {
            return;
        }
        install(log_level(), log_format());
    });
}

/// Install the subscriber with an explicit level, ignoring the environment.
pub fn init_with_level(level: &str) {
    let level = resolve_level(Some(level), false);
    INIT.call_once(|| install(level, log_format()));
}

#[cfg(feature = "tracing-subscriber")]
fn install(level: &'static str, format: LogFormat) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_new(filter_directive(level)).unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Json => registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    };
    if installed.is_ok() {
        tracing::debug!(level, format = ?format, "envurl logging initialized");
    }
}

#[cfg(not(feature = "tracing-subscriber"))]
fn install(_level: &'static str, _format: LogFormat) {
    // events go to whatever subscriber the application installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_level() {
        assert_eq!(resolve_level(None, false), "warn");
        assert_eq!(resolve_level(None, true), "debug");
        assert_eq!(resolve_level(Some("INFO"), false), "info");
        assert_eq!(resolve_level(Some("loud"), true), "debug");
        assert_eq!(resolve_level(Some("trace"), true), "trace");
    }

    #[test]
    fn test_log_format_from_name() {
        assert_eq!(LogFormat::from_name("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_name("Pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_name("other"), LogFormat::Compact);
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(
            filter_directive("debug"),
            "envurl=debug,envurl_core=debug,envurl_env=debug,envurl_cli=debug"
        );
    }
}
