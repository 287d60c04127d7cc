//! Log output setup.
//!
//! The library itself only emits `tracing` events; binaries and tests that
//! want to see them call [`init_logging`] once at startup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::errors::{EolError, Result};

/// Builds the filter for a logging configuration.
///
/// `RUST_LOG` wins over the configured level when it is set and valid.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| EolError::Config(format!("invalid log level {:?}: {e}", config.level))),
    }
}

/// Installs a global fmt subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| EolError::Config(format!("logging already initialised: {e}")))
}
