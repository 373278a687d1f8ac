use tracing_subscriber::EnvFilter;

use crate::config::ENV_LOG;

/// Installs the fmt subscriber. `SIZE_PREPROCESS_LOG` wins over `default_filter`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
