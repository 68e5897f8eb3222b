//! # Vault Access
//!
//! The provisioning engine consumes the vault through the narrow
//! [`VaultClient`] trait so a fake can stand in for the real service.
//!
//! ## Backends
//!
//! - [`HttpVaultClient`]: REST API over HTTPS, optional client certificate
//! - [`InMemoryVault`]: in-process store for dry runs and tests

pub mod client;
pub mod error;
pub mod http;
pub mod memory;

pub use client::{AccountQuery, VaultClient, VaultResponse, CONFLICT_VALUE_FIELD, ERROR_MESSAGE_FIELD};
pub use error::{Result, VaultError};
pub use http::HttpVaultClient;
pub use memory::InMemoryVault;
