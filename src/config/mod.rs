//! # Configuration Management
//!
//! Application settings for the provisioning engine. Values are layered with
//! the `config` crate: built-in defaults, then an optional settings file
//! (YAML or TOML, picked by extension), then `SAFEPROV__*` environment
//! variables (`SAFEPROV__VAULT__BASE_URL`, `SAFEPROV__PROVISIONING__MAX_CONCURRENT_CREATES`, ...).
//!
//! The naming/role/safe lookup tables live in [`catalog`].

pub mod catalog;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{Error, Result};

pub use catalog::{AccountConf, Catalog, CategoryEntry, EnvironmentSuffixes, ReconcileSafe};

/// Environment variable prefix for settings overrides.
pub const ENV_PREFIX: &str = "SAFEPROV";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// Vault connection settings
    #[validate(nested)]
    pub vault: VaultSettings,

    /// Provisioning behaviour
    #[validate(nested)]
    pub provisioning: ProvisioningSettings,

    /// Logging configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        match (&self.vault.client_cert_path, &self.vault.client_key_path) {
            (Some(_), None) | (None, Some(_)) => Err(Error::config(
                "vault.client_cert_path and vault.client_key_path must be set together",
            )),
            _ => Ok(()),
        }
    }
}

/// Vault connection settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct VaultSettings {
    /// Base URL of the vault REST API
    #[validate(url(message = "Vault base URL must be a valid URL"))]
    pub base_url: String,

    /// Vault environment label (e.g. STG, PRD), used in logs only
    #[validate(length(min = 1, message = "Vault environment cannot be empty"))]
    pub environment: String,

    /// PEM client certificate for mutual TLS
    pub client_cert_path: Option<PathBuf>,

    /// PEM private key matching `client_cert_path`
    pub client_key_path: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            base_url: "https://127.0.0.1:8443/api".to_string(),
            environment: "STG".to_string(),
            client_cert_path: None,
            client_key_path: None,
            timeout_seconds: 30,
        }
    }
}

impl VaultSettings {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Provisioning behaviour
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProvisioningSettings {
    /// Upper bound on concurrent account creations in one batch
    #[validate(range(min = 1, max = 64, message = "Max concurrent creates must be between 1 and 64"))]
    pub max_concurrent_creates: usize,

    /// Catalog file; the built-in catalog is used when unset
    pub catalog_path: Option<PathBuf>,
}

impl Default for ProvisioningSettings {
    fn default() -> Self {
        Self { max_concurrent_creates: 8, catalog_path: None }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Service name attached to log lines
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { service_name: "safeprov".to_string(), log_level: "info".to_string(), json_logging: false }
    }
}

/// Load configuration from an optional file plus `SAFEPROV__*` environment variables.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;

    tracing::debug!(
        vault_url = %config.vault.base_url,
        vault_environment = %config.vault.environment,
        max_concurrent_creates = config.provisioning.max_concurrent_creates,
        "Loaded configuration"
    );

    Ok(config)
}

/// Load the catalog named by the settings, or the built-in one.
pub fn load_catalog(settings: &ProvisioningSettings) -> Result<Catalog> {
    match &settings.catalog_path {
        Some(path) => Catalog::from_path(path),
        None => Catalog::builtin().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provisioning.max_concurrent_creates, 8);
        assert_eq!(config.vault.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_cert_without_key_is_rejected() {
        let mut config = AppConfig::default();
        config.vault.client_cert_path = Some(PathBuf::from("/etc/safeprov/client.pem"));

        let err = config.validate().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_out_of_range_concurrency_is_rejected() {
        let mut config = AppConfig::default();
        config.provisioning.max_concurrent_creates = 0;
        assert!(config.validate().unwrap_err().to_string().contains("Max concurrent creates"));
    }

    #[test]
    fn test_load_config_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "vault:\n  base_url: https://vault.internal:9443/api\n  environment: PRD\n\
             provisioning:\n  max_concurrent_creates: 4\n"
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.vault.base_url, "https://vault.internal:9443/api");
        assert_eq!(config.vault.environment, "PRD");
        assert_eq!(config.provisioning.max_concurrent_creates, 4);
        assert_eq!(config.vault.timeout_seconds, 30);
    }

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("SAFEPROV__OBSERVABILITY__SERVICE_NAME", "provisioner-test");

        let config = load_config(None).unwrap();
        assert_eq!(config.observability.service_name, "provisioner-test");

        std::env::remove_var("SAFEPROV__OBSERVABILITY__SERVICE_NAME");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/safeprov.yaml"))).unwrap_err();
        assert!(err.is_configuration());
    }
}
