use tracing_subscriber::EnvFilter;

use crate::config::ConfigError;

/// Installs the global `fmt` subscriber. `RUST_LOG` wins over `filter` when set.
pub fn init(filter: &str) -> Result<(), ConfigError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => EnvFilter::try_new(filter).map_err(|error| ConfigError::LogFilter {
            filter: filter.to_owned(),
            message: error.to_string(),
        })?,
    };

    // A second install (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
    Ok(())
}
