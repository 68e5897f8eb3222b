//! Safe resolution for a deployment.

use std::sync::Arc;

use tracing::debug;

use crate::config::Catalog;
use crate::domain::{Environment, SafeNamePair, SafePolicy};
use crate::errors::Result;
use crate::naming::{NamingConvention, ShortNameSafe};
use crate::vault::VaultClient;

/// Picks the generic and service safes of a deployment.
///
/// The service safe is used only when the vault already has it; otherwise
/// service accounts share the generic safe.
#[derive(Clone)]
pub struct SafeResolver {
    vault: Arc<dyn VaultClient>,
    catalog: Arc<Catalog>,
    short_name: Arc<dyn ShortNameSafe>,
}

impl SafeResolver {
    pub fn new(
        vault: Arc<dyn VaultClient>,
        catalog: Arc<Catalog>,
        short_name: Arc<dyn ShortNameSafe>,
    ) -> Self {
        Self { vault, catalog, short_name }
    }

    pub async fn resolve(&self, ecosystem: &str, zone: &str, env: Environment) -> Result<SafeNamePair> {
        let naming = NamingConvention::new(&self.catalog);
        let short_name = self.short_name.short_name_safe(ecosystem, zone);

        let generic = naming.derive_safe_name(&short_name, env, SafePolicy::Generic)?;
        let candidate = naming.derive_safe_name(&short_name, env, SafePolicy::Service)?;

        let service = if self.vault.safe_exists(&candidate, zone).await? {
            candidate
        } else {
            debug!(safe = %candidate, fallback = %generic, "No dedicated service safe");
            generic.clone()
        };

        Ok(SafeNamePair { generic, service })
    }
}
