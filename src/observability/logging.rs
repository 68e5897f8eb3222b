//! # Structured Logging
//!
//! Span macros shared by the provisioning entry points. Every span carries an
//! `operation_id` so the log lines of one provisioning call can be grouped.
//! Passwords are never recorded as span or event fields.

/// Create a tracing span for a provisioning operation.
///
/// ```rust,ignore
/// let span = provision_span!("create_all", ecosystem = "myapp", zone = "EU1");
/// ```
#[macro_export]
macro_rules! provision_span {
    ($operation:expr) => {
        tracing::info_span!(
            "provisioning",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::info_span!(
            "provisioning",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Create a debug span around a single vault call.
#[macro_export]
macro_rules! vault_span {
    ($operation:expr, $safe:expr, $user:expr) => {
        tracing::debug_span!(
            "vault_call",
            operation = %$operation,
            safe = %$safe,
            user = %$user
        )
    };
}

/// Log configuration at startup
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::info!(
        vault_url = %config.vault.base_url,
        vault_environment = %config.vault.environment,
        mutual_tls = config.vault.client_cert_path.is_some(),
        max_concurrent_creates = config.provisioning.max_concurrent_creates,
        catalog = ?config.provisioning.catalog_path,
        "Provisioning configuration"
    );
}
