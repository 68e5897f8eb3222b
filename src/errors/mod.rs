//! # Error Handling
//!
//! Crate-wide error type for the provisioning engine, built with `thiserror`.
//! Vault transport failures arrive as [`VaultError`](crate::vault::VaultError)
//! and are folded into [`Error::Transport`] or [`Error::Vault`].

use crate::vault::VaultError;

/// Custom result type for provisioning operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the provisioning engine
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A lookup key (environment, technology, category, zone) has no entry in
    /// the catalog, or the application settings are invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The vault could not be reached or answered with something unreadable.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The vault answered with an explicit error message.
    #[error("Vault error: {message} (status_code: {status})")]
    Vault { message: String, status: String },

    /// One or more account creations in a bulk batch failed.
    #[error("Error creating accounts: {}", messages.join("-"))]
    AggregateFailure { messages: Vec<String> },

}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Configuration { message: message.into(), source: Some(source) }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Check if this error should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Whether this error came from a missing or invalid configuration entry
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }
}

impl From<VaultError> for Error {
    fn from(error: VaultError) -> Self {
        match error {
            VaultError::Rejected { message, status } => Self::Vault {
                message,
                status: status.map_or_else(|| "unknown".to_string(), |s| s.to_string()),
            },
            VaultError::Config { message } => Self::config(message),
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Configuration loading failed", Box::new(error))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Self::config_with_source("Catalog parsing failed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_validation_messages("", &errors, &mut messages);
        Self::config(format!("Validation failed: {}", messages.join("; ")))
    }
}

/// Flatten nested validation errors into `path: message` entries.
fn collect_validation_messages(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut Vec<String>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() { field.to_string() } else { format!("{}.{}", prefix, field) };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let joined = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push(format!("{}: {}", path, joined));
            }
            ValidationErrorsKind::Struct(nested) => collect_validation_messages(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_messages(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = Error::config("Unknown environment 'QA'");
        assert!(error.is_configuration());
        assert_eq!(error.to_string(), "Configuration error: Unknown environment 'QA'");
    }

    #[test]
    fn test_aggregate_failure_joins_with_dash() {
        let error = Error::AggregateFailure { messages: vec!["first".into(), "second".into()] };
        assert_eq!(error.to_string(), "Error creating accounts: first-second");
    }

    #[test]
    fn test_retryable_errors() {
        assert!(Error::transport("connection refused").is_retryable());
        assert!(!Error::config("bad").is_retryable());
        assert!(!Error::AggregateFailure { messages: vec![] }.is_retryable());
    }

    #[test]
    fn test_vault_error_conversions() {
        let error: Error = VaultError::transport("timed out").into();
        assert!(matches!(error, Error::Transport(_)));

        let error: Error =
            VaultError::Rejected { message: "Safe is locked".into(), status: Some(403) }.into();
        assert_eq!(error.to_string(), "Vault error: Safe is locked (status_code: 403)");

        let error: Error = VaultError::Rejected { message: "nope".into(), status: None }.into();
        assert!(error.to_string().contains("status_code: unknown"));
    }

    #[test]
    fn test_yaml_error_is_configuration() {
        let yaml_error = serde_yaml::from_str::<Vec<u32>>("{not: a list").unwrap_err();
        let error: Error = yaml_error.into();
        assert!(error.is_configuration());
    }
}
