//! Diagnostic logging.
//!
//! Events go to stderr through `tracing-subscriber`. The filter comes from
//! `QSSH_LOG` (same syntax as `RUST_LOG`) and defaults to warnings only, so a
//! normal run prints nothing extra around the ssh session.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const ENV_LOG: &str = "QSSH_LOG";

const DEFAULT_FILTER: &str = "qssh=warn";

/// Build the filter from `QSSH_LOG`, falling back to warnings only
pub fn create_env_filter() -> EnvFilter {
    EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(create_env_filter())
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time()
        .try_init();
}
