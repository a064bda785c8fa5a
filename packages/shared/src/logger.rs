//! Logging setup utilities for the CodeSync backend.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// Both the library crate named by `crate_name` and the binary are filtered at
/// `default_log_level`. The filter can be overridden with the `RUST_LOG`
/// environment variable.
///
/// # Examples
///
/// ```no_run
/// use codesync_shared::logger::setup_logger;
///
/// setup_logger("codesync_server", "codesync_server", "info");
/// ```
pub fn setup_logger(crate_name: &str, binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}={},{}={},tower_http={}",
                    crate_name.replace('-', "_"),
                    default_log_level,
                    binary_name.replace('-', "_"),
                    default_log_level,
                    default_log_level,
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
