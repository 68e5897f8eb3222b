//! Sequential lookup-then-create.
//!
//! Each account is first looked up; only missing accounts are created. Calls
//! are made one at a time and the first error aborts the whole run, leaving
//! already created accounts in place. Every returned password is the one the
//! vault holds.

use std::sync::Arc;

use tracing::{debug, info, Instrument};

use crate::accounts::AccountSetBuilder;
use crate::domain::{AccountSpec, DeploymentRequest, GetOrCreateOutcome};
use crate::errors::{Error, Result};
use crate::vault::{AccountQuery, VaultClient};

pub struct GetOrCreateCoordinator {
    vault: Arc<dyn VaultClient>,
    builder: AccountSetBuilder,
}

impl GetOrCreateCoordinator {
    pub fn new(vault: Arc<dyn VaultClient>, builder: AccountSetBuilder) -> Self {
        Self { vault, builder }
    }

    pub async fn get_or_create(&self, request: &DeploymentRequest) -> Result<GetOrCreateOutcome> {
        let span = crate::provision_span!(
            "get_or_create",
            ecosystem = %request.ecosystem(),
            zone = %request.zone(),
            env = %request.env()
        );

        async {
            let specs = self.builder.build(request).await?;
            self.resolve_specs(specs).await
        }
        .instrument(span)
        .await
    }

    /// Resolve every spec to an existing password or create it.
    pub async fn resolve_specs(&self, mut specs: Vec<AccountSpec>) -> Result<GetOrCreateOutcome> {
        let mut password_created = false;

        for spec in specs.iter_mut() {
            let query = AccountQuery::from(&*spec);

            if let Some(password) = self.vault.get_account(&query).await? {
                debug!(safe = %spec.safe_name, user = %spec.user_name, "Found existing account");
                spec.password = password;
                continue;
            }

            let response = self.vault.create_account(spec).await?;
            if let Some(message) = response.error_message() {
                return Err(Error::Vault {
                    message: format!("{} : {}", message, spec),
                    status: response.status_label(),
                });
            }

            if response.already_exists() {
                // created by someone else since the lookup; the vault kept its own password
                let stored = self.vault.get_account(&query).await?.ok_or_else(|| Error::Vault {
                    message: format!("Account exists but its password could not be read : {}", spec),
                    status: response.status_label(),
                })?;
                info!(safe = %spec.safe_name, user = %spec.user_name, "Account already existed");
                spec.password = stored;
                continue;
            }

            info!(safe = %spec.safe_name, user = %spec.user_name, "Created missing account");
            password_created = true;
        }

        Ok(GetOrCreateOutcome { password_created, accounts: specs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Catalog;
    use crate::naming::ZonePrefixedShortName;
    use crate::domain::SecretString;
    use crate::safes::SafeResolver;
    use crate::vault::{InMemoryVault, VaultResponse};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Vault where the account shows up between the lookup and the create.
    struct LateArrivalVault {
        lookups: AtomicUsize,
        readable_after_create: bool,
    }

    #[async_trait]
    impl VaultClient for LateArrivalVault {
        async fn get_account(
            &self,
            _query: &AccountQuery,
        ) -> crate::vault::Result<Option<SecretString>> {
            let seen = self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok((seen > 0 && self.readable_after_create).then(|| SecretString::new("stored-in-vault")))
        }

        async fn create_account(&self, _spec: &AccountSpec) -> crate::vault::Result<VaultResponse> {
            Ok(VaultResponse::new(Some(409), json!({ "value": [{ "id": "9_9" }], "count": 1 })))
        }

        async fn get_safe_detail(&self, _safe: &str, _zone: &str) -> crate::vault::Result<Option<Value>> {
            Ok(None)
        }

        async fn delete_account(&self, _query: &AccountQuery) -> crate::vault::Result<VaultResponse> {
            Ok(VaultResponse::new(Some(204), Value::Null))
        }
    }

    fn late_arrival(readable_after_create: bool) -> GetOrCreateCoordinator {
        let catalog = Arc::new(Catalog::builtin().unwrap().clone());
        let resolver =
            SafeResolver::new(Arc::new(InMemoryVault::new()), catalog.clone(), Arc::new(ZonePrefixedShortName));
        let vault = Arc::new(LateArrivalVault { lookups: AtomicUsize::new(0), readable_after_create });
        GetOrCreateCoordinator::new(vault, AccountSetBuilder::new(resolver, catalog))
    }

    fn single_spec() -> AccountSpec {
        AccountSpec {
            safe_name: "US1-SHOP--INT-GEN".into(),
            account_type: "POSTGRESQL_GENERIC".into(),
            user_name: "1poAPPshopI".into(),
            role: "rw".into(),
            comment: "app".into(),
            zone: "US1".into(),
            address: "pg.local".into(),
            env: "INT".into(),
            env_letter: 'I',
            port: "5432".into(),
            database: "orders".into(),
            password: SecretString::new("freshly-generated"),
        }
    }

    fn coordinator(vault: Arc<InMemoryVault>) -> GetOrCreateCoordinator {
        let catalog = Arc::new(Catalog::builtin().unwrap().clone());
        let resolver = SafeResolver::new(vault.clone(), catalog.clone(), Arc::new(ZonePrefixedShortName));
        GetOrCreateCoordinator::new(vault, AccountSetBuilder::new(resolver, catalog))
    }

    fn request() -> DeploymentRequest {
        DeploymentRequest::new("shop", "US1", "pg.local", "int", "5432", "orders", "postgresql")
            .unwrap()
    }

    #[tokio::test]
    async fn test_second_run_finds_everything() {
        let vault = Arc::new(InMemoryVault::new());
        let coordinator = coordinator(vault.clone());

        let first = coordinator.get_or_create(&request()).await.unwrap();
        assert!(first.password_created);
        assert_eq!(vault.account_count().await, first.accounts.len());

        let second = coordinator.get_or_create(&request()).await.unwrap();
        assert!(!second.password_created);
        for (a, b) in first.accounts.iter().zip(&second.accounts) {
            assert_eq!(a.password, b.password);
        }
    }

    #[tokio::test]
    async fn test_rejection_aborts() {
        let vault = Arc::new(InMemoryVault::new().with_rejection("1poMONI", "Safe is locked", 403));
        let err = coordinator(vault.clone()).get_or_create(&request()).await.unwrap_err();

        match err {
            Error::Vault { message, status } => {
                assert!(message.starts_with("Safe is locked : {"));
                assert_eq!(status, "403");
            }
            other => panic!("expected vault error, got {:?}", other),
        }
        // generic and service were created before the monitoring account failed
        assert_eq!(vault.account_count().await, 2);
    }

    #[tokio::test]
    async fn test_existing_answer_returns_stored_password() {
        let outcome = late_arrival(true).resolve_specs(vec![single_spec()]).await.unwrap();

        assert!(!outcome.password_created);
        assert_eq!(outcome.accounts[0].password.expose_secret(), "stored-in-vault");
    }

    #[tokio::test]
    async fn test_existing_but_unreadable_is_an_error() {
        let err = late_arrival(false).resolve_specs(vec![single_spec()]).await.unwrap_err();

        match err {
            Error::Vault { message, status } => {
                assert!(message.starts_with("Account exists but its password could not be read : {"));
                assert!(!message.contains("freshly-generated"));
                assert_eq!(status, "409");
            }
            other => panic!("expected vault error, got {:?}", other),
        }
    }
}
