//! Tracing subscriber setup.
//!
//! Diagnostics go to stderr through `tracing`. The in-state operational log
//! shown to the user is separate and always written by the store.

use tracing_subscriber::EnvFilter;

use crate::config::{SessionConfig, DEFAULT_LOG_FILTER};

/// Builds the filter for `config`, falling back to the default directive when
/// the configured one does not parse.
pub fn env_filter(config: &SessionConfig) -> EnvFilter {
    EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global subscriber. Returns false when one is already set.
pub fn init_tracing(config: &SessionConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_ansi(false);

    let installed = if config.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.is_ok()
}
