//! # safeprov
//!
//! Provisions database service-account credentials into a centralized
//! secrets vault. From one deployment descriptor (ecosystem, zone,
//! environment, technology, optional schema and admin accounts) it derives
//! every account the deployment needs, places each in the right safe,
//! generates compliant passwords and creates the accounts.
//!
//! ## Architecture
//!
//! ```text
//! DeploymentRequest → AccountSetBuilder ─┬→ ProvisioningOrchestrator → ProvisioningReport
//!        (naming, safes, passwords)     └→ GetOrCreateCoordinator   → GetOrCreateOutcome
//!                                                  ↓
//!                                             VaultClient
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use safeprov::{
//!     config::{Catalog, ProvisioningSettings},
//!     naming::ZonePrefixedShortName,
//!     vault::InMemoryVault,
//!     CredentialService, DeploymentRequest, Result,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let service = CredentialService::new(
//!         Arc::new(InMemoryVault::new()),
//!         Arc::new(Catalog::builtin()?.clone()),
//!         Arc::new(ZonePrefixedShortName),
//!         &ProvisioningSettings::default(),
//!     );
//!
//!     let request =
//!         DeploymentRequest::new("myapp", "EU1", "db.local", "PROD", "27017", "db1", "mongodb")?;
//!     let report = service.create_accounts(&request).await?;
//!     println!("{} accounts created", report.succeeded.len());
//!     Ok(())
//! }
//! ```

pub mod accounts;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod naming;
pub mod observability;
pub mod password;
pub mod provisioning;
pub mod safes;
pub mod services;
pub mod vault;

// Re-export commonly used types and traits
pub use config::{AppConfig, Catalog};
pub use domain::{AccountSpec, DeploymentRequest, ProvisioningReport, ProvisioningResult};
pub use errors::{Error, Result};
pub use services::CredentialService;
pub use vault::VaultClient;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
