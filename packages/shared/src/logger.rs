//! Logging setup for the Hiroba binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// `crate_name` is the library crate whose logs should be emitted alongside the
/// binary's own logs. Both are filtered at `default_log_level` unless the
/// `RUST_LOG` environment variable overrides it.
///
/// # Examples
///
/// ```no_run
/// use hiroba_shared::logger::setup_logger;
///
/// setup_logger("hiroba_server", "hiroba_server", "debug");
/// ```
pub fn setup_logger(crate_name: &str, binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives(crate_name, binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_directives(crate_name: &str, binary_name: &str, default_log_level: &str) -> String {
    let crate_name = crate_name.replace('-', "_");
    let binary_name = binary_name.replace('-', "_");
    if crate_name == binary_name {
        format!("{}={},tower_http={}", crate_name, default_log_level, default_log_level)
    } else {
        format!(
            "{}={},{}={},tower_http={}",
            crate_name, default_log_level, binary_name, default_log_level, default_log_level
        )
    }
}
