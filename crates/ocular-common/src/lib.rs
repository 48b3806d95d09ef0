//! Shared utilities for Ocular: logging setup.

#![forbid(unsafe_code)]

use tracing_subscriber::EnvFilter;

/// Initialize tracing with env-filter support. Reads `RUST_LOG`,
/// defaulting to info level.
pub fn init_tracing() {
    init_tracing_with_default("info");
}

/// Initialize tracing with a custom default filter used when `RUST_LOG`
/// is unset.
pub fn init_tracing_with_default(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let directives = filter.to_string();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    tracing::debug!(filter = %directives, "tracing initialized");
}
