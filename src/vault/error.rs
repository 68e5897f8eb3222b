//! Error types for vault client operations.

use thiserror::Error;

/// Result type for vault client operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Errors raised by a [`VaultClient`](super::VaultClient).
///
/// Messages never carry account passwords.
#[derive(Error, Debug)]
pub enum VaultError {
    /// The vault could not be reached (connection refused, TLS failure, timeout).
    #[error("Vault transport failed: {message}")]
    Transport { message: String },

    /// The vault answered, but not with something we can read.
    #[error("Invalid vault response: {message}")]
    InvalidResponse { message: String },

    /// The vault answered with an explicit error message.
    #[error("{message} - status_code: {}", status.map_or_else(|| "unknown".to_string(), |s| s.to_string()))]
    Rejected { message: String, status: Option<u16> },

    /// The client itself is misconfigured (bad base URL, unreadable identity).
    #[error("Vault client configuration error: {message}")]
    Config { message: String },
}

impl VaultError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse { message: message.into() }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}

impl From<reqwest::Error> for VaultError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::invalid_response(error.to_string())
        } else {
            Self::transport(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VaultError::transport("connection refused");
        assert_eq!(err.to_string(), "Vault transport failed: connection refused");

        let err = VaultError::Rejected { message: "Safe not found".into(), status: Some(404) };
        assert_eq!(err.to_string(), "Safe not found - status_code: 404");

        let err = VaultError::Rejected { message: "Denied".into(), status: None };
        assert_eq!(err.to_string(), "Denied - status_code: unknown");
    }
}
