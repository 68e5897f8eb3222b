//! Credential provisioning service.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::accounts::AccountSetBuilder;
use crate::config::{Catalog, ProvisioningSettings};
use crate::domain::{AccountSpec, DeploymentRequest, GetOrCreateOutcome, ProvisioningReport, SecretString};
use crate::errors::Result;
use crate::naming::ShortNameSafe;
use crate::provisioning::{GetOrCreateCoordinator, ProvisioningOrchestrator};
use crate::safes::SafeResolver;
use crate::vault::{AccountQuery, VaultClient, VaultResponse};

/// Entry point for provisioning deployments and managing single accounts.
pub struct CredentialService {
    vault: Arc<dyn VaultClient>,
    builder: AccountSetBuilder,
    orchestrator: ProvisioningOrchestrator,
    coordinator: GetOrCreateCoordinator,
}

impl CredentialService {
    pub fn new(
        vault: Arc<dyn VaultClient>,
        catalog: Arc<Catalog>,
        short_name: Arc<dyn ShortNameSafe>,
        settings: &ProvisioningSettings,
    ) -> Self {
        let resolver = SafeResolver::new(Arc::clone(&vault), Arc::clone(&catalog), short_name);
        let builder = AccountSetBuilder::new(resolver, catalog);

        Self {
            orchestrator: ProvisioningOrchestrator::new(
                Arc::clone(&vault),
                builder.clone(),
                settings.max_concurrent_creates,
            ),
            coordinator: GetOrCreateCoordinator::new(Arc::clone(&vault), builder.clone()),
            builder,
            vault,
        }
    }

    /// Password of one account, `None` when it does not exist.
    #[instrument(skip(self, query), fields(safe = %query.safe_name, user = %query.user_name))]
    pub async fn get_account(&self, query: &AccountQuery) -> Result<Option<SecretString>> {
        let password = self.vault.get_account(query).await?;
        info!(found = password.is_some(), "Account lookup");
        Ok(password)
    }

    /// Create every account of a deployment concurrently.
    pub async fn create_accounts(&self, request: &DeploymentRequest) -> Result<ProvisioningReport> {
        self.orchestrator.create_all(request).await
    }

    /// Reuse existing passwords, creating the accounts that are missing.
    pub async fn get_password_or_create_accounts(
        &self,
        request: &DeploymentRequest,
    ) -> Result<GetOrCreateOutcome> {
        self.coordinator.get_or_create(request).await
    }

    #[instrument(skip(self, query), fields(safe = %query.safe_name, user = %query.user_name))]
    pub async fn delete_account(&self, query: &AccountQuery) -> Result<VaultResponse> {
        let response = self.vault.delete_account(query).await?;
        match response.error_message() {
            Some(message) => warn!(status = %response.status_label(), error = %message, "Delete rejected"),
            None => info!("Account deleted"),
        }
        Ok(response)
    }

    /// The account set a deployment would get, without creating anything.
    #[instrument(skip(self, request), fields(ecosystem = %request.ecosystem(), zone = %request.zone()))]
    pub async fn plan(&self, request: &DeploymentRequest) -> Result<Vec<AccountSpec>> {
        self.builder.build(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::ZonePrefixedShortName;
    use crate::vault::InMemoryVault;

    fn service(vault: Arc<InMemoryVault>) -> CredentialService {
        CredentialService::new(
            vault,
            Arc::new(Catalog::builtin().unwrap().clone()),
            Arc::new(ZonePrefixedShortName),
            &ProvisioningSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_plan_does_not_touch_accounts() {
        let vault = Arc::new(InMemoryVault::new());
        let request =
            DeploymentRequest::new("myapp", "EU2", "h", "UAT", "3306", "shop", "mysql").unwrap();

        let specs = service(vault.clone()).plan(&request).await.unwrap();
        assert_eq!(specs.len(), 4);
        assert_eq!(vault.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let vault = Arc::new(InMemoryVault::new());
        let service = service(vault.clone());
        let request =
            DeploymentRequest::new("myapp", "EU2", "h", "UAT", "3306", "shop", "mysql").unwrap();

        let report = service.create_accounts(&request).await.unwrap();
        assert!(report.is_success());

        let created = &report.succeeded[0];
        let query = AccountQuery {
            zone: "EU2".into(),
            safe_name: created.info["safeName"].as_str().unwrap().into(),
            user_name: created.info["userName"].as_str().unwrap().into(),
            address: "h".into(),
            database: Some("shop".into()),
        };

        let password = service.get_account(&query).await.unwrap().unwrap();
        assert_eq!(password, created.password);

        let deleted = service.delete_account(&query).await.unwrap();
        assert!(deleted.error_message().is_none());
        assert!(service.get_account(&query).await.unwrap().is_none());
    }
}
