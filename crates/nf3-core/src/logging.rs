//! Structured logging setup.
//!
//! Logs go to stderr so stdout carries only the report. The filter comes from
//! `-v` flags when given, otherwise from `NF3_LOG`, otherwise `warn`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV_VAR: &str = "NF3_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

/// Directive for a `-v` count; `None` when no flag was given.
pub fn verbosity_directive(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

fn build_filter(verbosity: u8) -> EnvFilter {
    match verbosity_directive(verbosity) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init_logging(verbosity: u8, json: bool) {
    let registry = tracing_subscriber::registry().with(build_filter(verbosity));
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    // Already initialized (tests, embedding callers).
    let _ = result;
}
