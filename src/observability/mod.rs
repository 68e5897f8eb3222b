//! # Observability
//!
//! Structured logging for the provisioning engine. Log lines go to stderr so
//! command output on stdout stays machine-readable.

pub mod logging;

pub use logging::log_config_info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level; `verbose` raises the configured
/// level to `debug`. A subscriber that is already installed is left in place.
pub fn init_logging(config: &ObservabilityConfig, verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { config.log_level.as_str() };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level).map_err(|e| {
            Error::config_with_source(format!("Invalid log level '{}'", default_level), Box::new(e))
        })?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json_logging {
        registry
            .with(fmt::layer().json().with_current_span(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(false).with_writer(std::io::stderr)).try_init()
    };

    if installed.is_err() {
        // Subscriber already set elsewhere (e.g. integration tests); ignore.
        return Ok(());
    }

    tracing::debug!(
        service_name = %config.service_name,
        json = config.json_logging,
        "Logging initialized"
    );
    Ok(())
}
