//! Diagnostic logging to stderr via `tracing`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter, e.g. `passkeeper=debug`.
pub const LOG_ENV: &str = "PASSKEEPER_LOG";

/// Install the global subscriber.
///
/// `PASSKEEPER_LOG` wins over `default_level`. Calling this twice is
/// harmless; the second call is ignored.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
