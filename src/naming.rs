//! # Naming Conventions
//!
//! Derivation of safe names and account usernames from deployment attributes.
//! Everything here is pure: the same inputs and catalog always yield the same
//! names.
//!
//! Username layout, for a zone `EU1`, technology `mongodb`, environment `PROD`:
//!
//! ```text
//! RECONCILE   <prefix> 1 CYBERARKRECO P
//! MONITORING  <prefix> 1 mo <code> P
//! others      <prefix> 1 mo <code> <ecosystem token> P
//! ```

use crate::config::Catalog;
use crate::domain::{AccountFunctionCategory, Environment, SafePolicy, Technology};
use crate::errors::{Error, Result};

/// Fixed body of reconciliation account usernames.
pub const RECONCILE_USERNAME_BODY: &str = "CYBERARKRECO";

/// Separator between the short safe name and the environment suffix.
pub const SAFE_NAME_SEPARATOR: &str = "--";

const ECOSYSTEM_TOKEN_LEN: usize = 8;

/// Builds the short "ecosystem/region" prefix shared by a deployment's safes.
///
/// Owned by the vault team; injected so deployments can plug in their own
/// naming helper.
pub trait ShortNameSafe: Send + Sync {
    fn short_name_safe(&self, ecosystem: &str, region: &str) -> String;
}

/// `<REGION>-<ECOSYSTEM TOKEN>`, upper-cased.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZonePrefixedShortName;

impl ShortNameSafe for ZonePrefixedShortName {
    fn short_name_safe(&self, ecosystem: &str, region: &str) -> String {
        format!("{}-{}", region.to_uppercase(), truncate_ecosystem_token(ecosystem).to_uppercase())
    }
}

/// Remove `-` and `_` from an ecosystem name and keep at most 8 characters.
pub fn truncate_ecosystem_token(ecosystem: &str) -> String {
    ecosystem.chars().filter(|c| *c != '-' && *c != '_').take(ECOSYSTEM_TOKEN_LEN).collect()
}

/// Name derivation against one catalog.
#[derive(Debug, Clone, Copy)]
pub struct NamingConvention<'a> {
    catalog: &'a Catalog,
}

impl<'a> NamingConvention<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Username of a mandatory account.
    pub fn derive_username(
        &self,
        category: AccountFunctionCategory,
        zone: &str,
        techno: Technology,
        ecosystem_token: &str,
        env: Environment,
    ) -> Result<String> {
        let entry = self.catalog.category(category)?;
        let prefix = self.catalog.username_prefix(entry.policy)?;
        let zone_char = zone
            .chars()
            .last()
            .ok_or_else(|| Error::config("Zone cannot be empty when deriving usernames"))?;

        let body = match category {
            AccountFunctionCategory::Reconcile => RECONCILE_USERNAME_BODY.to_string(),
            AccountFunctionCategory::Monitoring => {
                format!("{}{}", techno.short_code(), entry.code)
            }
            _ => format!("{}{}{}", techno.short_code(), entry.code, ecosystem_token),
        };

        Ok(format!("{}{}{}{}", prefix, zone_char, body, env.letter()))
    }

    /// `<short name>--<environment suffix for the policy>`.
    pub fn derive_safe_name(
        &self,
        short_name_safe: &str,
        env: Environment,
        policy: SafePolicy,
    ) -> Result<String> {
        let suffix = self.catalog.safe_suffix(env, policy)?;
        Ok(format!("{}{}{}", short_name_safe, SAFE_NAME_SEPARATOR, suffix))
    }
}
