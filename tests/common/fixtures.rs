use std::collections::HashSet;
use std::sync::Arc;

use safeprov::config::{Catalog, ProvisioningSettings};
use safeprov::domain::{AccountSpec, SecretString};
use safeprov::naming::ZonePrefixedShortName;
use safeprov::vault::{AccountQuery, InMemoryVault, VaultClient, VaultError, VaultResponse};
use safeprov::{CredentialService, DeploymentRequest};

pub fn builtin_catalog() -> Arc<Catalog> {
    Arc::new(Catalog::builtin().expect("built-in catalog").clone())
}

pub fn service_with(vault: Arc<dyn VaultClient>, max_concurrent_creates: usize) -> CredentialService {
    let settings = ProvisioningSettings { max_concurrent_creates, ..ProvisioningSettings::default() };
    CredentialService::new(vault, builtin_catalog(), Arc::new(ZonePrefixedShortName), &settings)
}

pub fn service(vault: Arc<InMemoryVault>) -> CredentialService {
    service_with(vault, 8)
}

/// The reference deployment: myapp / EU1 / PROD / mongodb / db1.
pub fn myapp_request() -> DeploymentRequest {
    DeploymentRequest::new("myapp", "EU1", "mongo.eu1.local", "PROD", "27017", "db1", "mongodb")
        .expect("valid request")
}

/// Vault double that panics inside `create_account` for selected users and
/// delegates everything else to an in-memory vault.
pub struct PanickingVault {
    pub inner: InMemoryVault,
    pub panic_for: HashSet<String>,
}

#[async_trait::async_trait]
impl VaultClient for PanickingVault {
    async fn get_account(&self, query: &AccountQuery) -> Result<Option<SecretString>, VaultError> {
        self.inner.get_account(query).await
    }

    async fn create_account(&self, spec: &AccountSpec) -> Result<VaultResponse, VaultError> {
        if self.panic_for.contains(&spec.user_name) {
            panic!("vault client bug while creating {}", spec.user_name);
        }
        self.inner.create_account(spec).await
    }

    async fn get_safe_detail(
        &self,
        safe_name: &str,
        zone: &str,
    ) -> Result<Option<serde_json::Value>, VaultError> {
        self.inner.get_safe_detail(safe_name, zone).await
    }

    async fn delete_account(&self, query: &AccountQuery) -> Result<VaultResponse, VaultError> {
        self.inner.delete_account(query).await
    }
}
