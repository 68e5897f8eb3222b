//! Domain layer
//!
//! Pure types describing a deployment, the accounts derived from it, and the
//! outcome of provisioning those accounts in the vault. Nothing here talks to
//! the vault or reads configuration files.
//!
//! ## Module Organization
//!
//! - `deployment`: the deployment descriptor and its closed enumerations
//! - `account`: functional categories, safe policies and account specifications
//! - `outcome`: per-account creation outcomes and batch results
//! - `secret`: redacting wrapper for generated passwords

pub mod account;
pub mod deployment;
pub mod outcome;
pub mod secret;

pub use account::{AccountFunctionCategory, AccountSpec, SafeNamePair, SafePolicy};
pub use deployment::{DeploymentDescriptor, DeploymentRequest, Environment, Technology};
pub use outcome::{
    AccountInfo, CreatedAccount, CreationOutcome, FailedAccount, GetOrCreateOutcome,
    ProvisioningReport, ProvisioningResult, ResolvedCredential,
};
pub use secret::SecretString;
