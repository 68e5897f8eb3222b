//! Read-only lookup tables driving account derivation.
//!
//! The catalog maps categories, policies, environments and technologies to
//! codes, roles, comments and safe suffixes. Every lookup fails with a
//! configuration error when the key has no entry; nothing falls back to a
//! default value.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::domain::{AccountFunctionCategory, Environment, SafePolicy, Technology};
use crate::errors::{Error, Result};

const BUILTIN_CATALOG: &str = include_str!("catalog.yaml");

static BUILTIN: OnceCell<Catalog> = OnceCell::new();

/// One mandatory account category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub category: AccountFunctionCategory,
    pub code: String,
    pub role: String,
    pub comment: String,
    pub policy: SafePolicy,
}

/// Safe suffixes of one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSuffixes {
    #[serde(rename = "GEN")]
    pub generic: String,
    #[serde(rename = "SERVICE")]
    pub service: String,
}

impl EnvironmentSuffixes {
    pub fn for_policy(&self, policy: SafePolicy) -> &str {
        match policy {
            SafePolicy::Generic => &self.generic,
            SafePolicy::Service => &self.service,
        }
    }
}

/// Reconciliation safe of a technology: shared, or one per zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReconcileSafe {
    Single(String),
    PerZone(BTreeMap<String, String>),
}

/// Role and comment of schema or admin accounts for one technology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConf {
    pub role: String,
    pub comment: String,
}

/// The full set of lookup tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    categories: Vec<CategoryEntry>,
    username_prefixes: BTreeMap<SafePolicy, String>,
    account_type_suffixes: BTreeMap<SafePolicy, String>,
    environments: BTreeMap<Environment, EnvironmentSuffixes>,
    reconcile_safes: BTreeMap<Technology, ReconcileSafe>,
    #[serde(default)]
    schema_accounts: BTreeMap<Technology, AccountConf>,
    #[serde(default)]
    admin_accounts: BTreeMap<Technology, AccountConf>,
}

impl Catalog {
    /// The catalog compiled into the binary. Parsed once.
    pub fn builtin() -> Result<&'static Catalog> {
        BUILTIN.get_or_try_init(|| Catalog::from_yaml_str(BUILTIN_CATALOG))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            Error::config_with_source(format!("Cannot read catalog {}", path.display()), Box::new(e))
        })?;
        let catalog = Self::from_yaml_str(&yaml)?;
        tracing::info!(path = %path.display(), categories = catalog.categories.len(), "Loaded catalog");
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(Error::config("Catalog defines no account categories"));
        }

        let mut seen = HashSet::new();
        for entry in &self.categories {
            if !seen.insert(entry.category) {
                return Err(Error::config(format!(
                    "Category {} is defined more than once",
                    entry.category
                )));
            }
            if entry.code.is_empty() && entry.category != AccountFunctionCategory::Reconcile {
                return Err(Error::config(format!("Category {} has an empty code", entry.category)));
            }
        }

        Ok(())
    }

    /// Mandatory categories, in build order.
    pub fn categories(&self) -> &[CategoryEntry] {
        &self.categories
    }

    pub fn category(&self, category: AccountFunctionCategory) -> Result<&CategoryEntry> {
        self.categories
            .iter()
            .find(|entry| entry.category == category)
            .ok_or_else(|| Error::config(format!("No catalog entry for category {}", category)))
    }

    pub fn username_prefix(&self, policy: SafePolicy) -> Result<&str> {
        self.username_prefixes
            .get(&policy)
            .map(String::as_str)
            .ok_or_else(|| Error::config(format!("No username prefix for policy {}", policy)))
    }

    pub fn account_type_suffix(&self, policy: SafePolicy) -> Result<&str> {
        self.account_type_suffixes
            .get(&policy)
            .map(String::as_str)
            .ok_or_else(|| Error::config(format!("No account type suffix for policy {}", policy)))
    }

    pub fn safe_suffix(&self, env: Environment, policy: SafePolicy) -> Result<&str> {
        self.environments
            .get(&env)
            .map(|suffixes| suffixes.for_policy(policy))
            .ok_or_else(|| Error::config(format!("No safe suffixes for environment {}", env)))
    }

    /// Reconciliation safe for a technology, resolved per zone when the
    /// technology has one safe per zone.
    pub fn reconcile_safe(&self, techno: Technology, zone: &str) -> Result<&str> {
        match self.reconcile_safes.get(&techno) {
            Some(ReconcileSafe::Single(safe)) => Ok(safe.as_str()),
            Some(ReconcileSafe::PerZone(zones)) => zones.get(zone).map(String::as_str).ok_or_else(|| {
                Error::config(format!("No reconciliation safe for {} in zone {}", techno, zone))
            }),
            None => Err(Error::config(format!("No reconciliation safe for {}", techno))),
        }
    }

    pub fn schema_conf(&self, techno: Technology) -> Result<&AccountConf> {
        self.schema_accounts
            .get(&techno)
            .ok_or_else(|| Error::config(format!("No schema account configuration for {}", techno)))
    }

    pub fn admin_conf(&self, techno: Technology) -> Result<&AccountConf> {
        self.admin_accounts
            .get(&techno)
            .ok_or_else(|| Error::config(format!("No admin account configuration for {}", techno)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
categories:
  - { category: GENERIC, code: APP, role: rw, comment: app, policy: GEN }
username_prefixes: { GEN: "" }
account_type_suffixes: { GEN: "_GENERIC" }
environments:
  DEV: { GEN: DEV-GEN, SERVICE: DEV-SVC }
reconcile_safes:
  oracle: ORA-RECO
"#;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = Catalog::builtin().unwrap();
        let order: Vec<_> = catalog.categories().iter().map(|c| c.category).collect();
        assert_eq!(order, AccountFunctionCategory::ALL.to_vec());

        for env in Environment::ALL {
            assert!(catalog.safe_suffix(env, SafePolicy::Generic).is_ok());
        }
        for techno in Technology::ALL {
            assert!(catalog.schema_conf(techno).is_ok());
            assert!(catalog.admin_conf(techno).is_ok());
        }
    }

    #[test]
    fn test_reconcile_safe_per_zone() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.reconcile_safe(Technology::Mongodb, "EU1").unwrap(), "EU1-MONGODB-RECO");
        assert_eq!(catalog.reconcile_safe(Technology::Oracle, "EU1").unwrap(), "ORACLE-RECO");
        assert!(catalog.reconcile_safe(Technology::Mongodb, "ZZ9").unwrap_err().is_configuration());
    }

    #[test]
    fn test_missing_entries_fail_fast() {
        let catalog = Catalog::from_yaml_str(MINIMAL).unwrap();

        assert!(catalog.safe_suffix(Environment::Prod, SafePolicy::Generic).is_err());
        assert!(catalog.username_prefix(SafePolicy::Service).is_err());
        assert!(catalog.account_type_suffix(SafePolicy::Service).is_err());
        assert!(catalog.reconcile_safe(Technology::Mongodb, "EU1").is_err());
        assert!(catalog.schema_conf(Technology::Oracle).is_err());
        assert!(catalog.category(AccountFunctionCategory::Monitoring).is_err());
    }

    #[test]
    fn test_duplicate_category_is_rejected() {
        let yaml = MINIMAL.replace(
            "categories:\n",
            "categories:\n  - { category: GENERIC, code: DUP, role: rw, comment: dup, policy: GEN }\n",
        );
        let err = Catalog::from_yaml_str(&yaml).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_unknown_environment_key_is_rejected() {
        let yaml = MINIMAL.replace("DEV: {", "QA: {");
        assert!(Catalog::from_yaml_str(&yaml).unwrap_err().is_configuration());
    }

    #[test]
    fn test_from_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), MINIMAL).unwrap();
        let catalog = Catalog::from_path(file.path()).unwrap();
        assert_eq!(catalog.categories().len(), 1);

        let err = Catalog::from_path(Path::new("/nonexistent/catalog.yaml")).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("Cannot read catalog /nonexistent/catalog.yaml"));
    }
}
