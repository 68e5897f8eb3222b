//! # Provisioning
//!
//! Two ways of pushing an account set into the vault:
//!
//! - [`ProvisioningOrchestrator`]: concurrent bulk creation with per-account
//!   failure containment
//! - [`GetOrCreateCoordinator`]: sequential lookup-then-create that aborts on
//!   the first error

pub mod get_or_create;
pub mod orchestrator;

pub use get_or_create::GetOrCreateCoordinator;
pub use orchestrator::{classify, ProvisioningOrchestrator};
