//! # Account Set Builder
//!
//! Turns one deployment into the full list of accounts it needs:
//!
//! 1. one account per catalog category, in catalog order
//! 2. one account per schema name, in the generic safe
//! 3. one account per admin name, in the service safe
//!
//! Every account gets a freshly generated password.

use std::sync::Arc;

use tracing::debug;

use crate::config::Catalog;
use crate::domain::{
    AccountFunctionCategory, AccountSpec, DeploymentRequest, SafeNamePair, SafePolicy,
};
use crate::errors::Result;
use crate::naming::{truncate_ecosystem_token, NamingConvention};
use crate::password::PasswordGenerator;
use crate::safes::SafeResolver;

/// Fields shared by every account of one deployment.
struct Identity<'a> {
    safe_name: String,
    account_type: String,
    user_name: String,
    role: &'a str,
    comment: String,
}

#[derive(Clone)]
pub struct AccountSetBuilder {
    resolver: SafeResolver,
    catalog: Arc<Catalog>,
    passwords: PasswordGenerator,
}

impl AccountSetBuilder {
    pub fn new(resolver: SafeResolver, catalog: Arc<Catalog>) -> Self {
        Self { resolver, catalog, passwords: PasswordGenerator::new() }
    }

    /// Build every account spec for the deployment.
    pub async fn build(&self, request: &DeploymentRequest) -> Result<Vec<AccountSpec>> {
        let safes =
            self.resolver.resolve(request.ecosystem(), request.zone(), request.env()).await?;
        self.build_with_safes(request, &safes)
    }

    /// Build the specs against an already resolved safe pair.
    pub fn build_with_safes(
        &self,
        request: &DeploymentRequest,
        safes: &SafeNamePair,
    ) -> Result<Vec<AccountSpec>> {
        let catalog = self.catalog.as_ref();
        let naming = NamingConvention::new(catalog);
        let techno = request.techno();
        let token = truncate_ecosystem_token(request.ecosystem());
        let service_type =
            format!("{}{}", techno.account_type_prefix(), catalog.account_type_suffix(SafePolicy::Service)?);

        let mut identities =
            Vec::with_capacity(catalog.categories().len() + request.schemas().len() + request.admins().len());

        for entry in catalog.categories() {
            let safe_name = match entry.category {
                AccountFunctionCategory::Reconcile => {
                    catalog.reconcile_safe(techno, &request.zone().to_uppercase())?.to_string()
                }
                _ => safes.for_policy(entry.policy).to_string(),
            };

            identities.push(Identity {
                safe_name,
                account_type: format!(
                    "{}{}",
                    techno.account_type_prefix(),
                    catalog.account_type_suffix(entry.policy)?
                ),
                user_name: naming.derive_username(
                    entry.category,
                    request.zone(),
                    techno,
                    &token,
                    request.env(),
                )?,
                role: &entry.role,
                comment: entry.comment.clone(),
            });
        }

        if !request.schemas().is_empty() {
            let conf = catalog.schema_conf(techno)?;
            for schema in request.schemas() {
                identities.push(Identity {
                    safe_name: safes.generic.clone(),
                    account_type: service_type.clone(),
                    user_name: schema.clone(),
                    role: &conf.role,
                    comment: format!("{}{}", conf.comment, request.database()),
                });
            }
        }

        if !request.admins().is_empty() {
            let conf = catalog.admin_conf(techno)?;
            for admin in request.admins() {
                identities.push(Identity {
                    safe_name: safes.service.clone(),
                    account_type: service_type.clone(),
                    user_name: admin.clone(),
                    role: &conf.role,
                    comment: conf.comment.clone(),
                });
            }
        }

        let specs: Vec<AccountSpec> =
            identities.into_iter().map(|identity| self.stamp(identity, request)).collect();

        debug!(
            accounts = specs.len(),
            generic_safe = %safes.generic,
            service_safe = %safes.service,
            "Built account set"
        );

        Ok(specs)
    }

    fn stamp(&self, identity: Identity<'_>, request: &DeploymentRequest) -> AccountSpec {
        let env = request.env();
        AccountSpec {
            safe_name: identity.safe_name,
            account_type: identity.account_type,
            user_name: identity.user_name,
            role: identity.role.to_string(),
            comment: identity.comment,
            zone: request.zone().to_string(),
            address: request.address().to_string(),
            env: env.as_str().to_string(),
            env_letter: env.letter(),
            port: request.port().to_string(),
            database: request.database().to_string(),
            password: self.passwords.generate(),
        }
    }
}
