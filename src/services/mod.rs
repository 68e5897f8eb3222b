//! Business logic services
//!
//! The service layer wires the injected collaborators (vault client, catalog,
//! short-name helper) into the provisioning components and is the surface the
//! CLI talks to.

pub mod credential_service;

pub use credential_service::CredentialService;
