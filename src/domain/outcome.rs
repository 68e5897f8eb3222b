//! Outcomes of provisioning calls.

use serde::Serialize;

use super::account::AccountSpec;
use super::secret::{expose, SecretString};
use crate::errors::Error;

/// Account fields as returned by the vault.
pub type AccountInfo = serde_json::Map<String, serde_json::Value>;

/// Terminal state of one creation request.
#[derive(Debug, Clone, PartialEq)]
pub enum CreationOutcome {
    /// The vault created the account.
    Created(AccountInfo),
    /// The account already existed; the vault returned its record.
    ConflictExisting(AccountInfo),
    /// The call raised or the vault returned an error. The message never
    /// contains the password.
    Failed(String),
}

impl CreationOutcome {
    /// `ConflictExisting` counts as success.
    pub fn is_success(&self) -> bool {
        !matches!(self, CreationOutcome::Failed(_))
    }
}

/// A provisioned account handed back to the caller, password included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedAccount {
    #[serde(flatten)]
    pub info: AccountInfo,

    #[serde(serialize_with = "expose")]
    pub password: SecretString,

    /// True when the vault reported the account as already present.
    #[serde(skip)]
    pub already_existed: bool,
}

/// A creation that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedAccount {
    pub safe_name: String,
    pub user_name: String,
    pub message: String,
}

/// Structured result of one bulk creation batch.
///
/// Both lists keep the order of the account set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProvisioningReport {
    pub succeeded: Vec<CreatedAccount>,
    pub failed: Vec<FailedAccount>,
}

impl ProvisioningReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Collapse into the all-or-nothing view: either every created account,
    /// or only the failure messages.
    pub fn into_result(self) -> ProvisioningResult {
        if self.failed.is_empty() {
            ProvisioningResult::Success { created_accounts: self.succeeded }
        } else {
            ProvisioningResult::Failure {
                errors: self.failed.into_iter().map(|f| f.message).collect(),
            }
        }
    }
}

/// All-or-nothing outcome of a bulk creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProvisioningResult {
    Success { created_accounts: Vec<CreatedAccount> },
    Failure { errors: Vec<String> },
}

impl ProvisioningResult {
    pub fn success(&self) -> bool {
        matches!(self, ProvisioningResult::Success { .. })
    }

    /// Raise the failure list as a single aggregated error.
    pub fn into_error(self) -> Result<Vec<CreatedAccount>, Error> {
        match self {
            ProvisioningResult::Success { created_accounts } => Ok(created_accounts),
            ProvisioningResult::Failure { errors } => {
                Err(Error::AggregateFailure { messages: errors })
            }
        }
    }
}

/// Result of the sequential get-or-create path.
#[derive(Debug, Clone, PartialEq)]
pub struct GetOrCreateOutcome {
    /// True if at least one account had to be created.
    pub password_created: bool,
    /// Every spec, with its password resolved from the vault or freshly created.
    pub accounts: Vec<AccountSpec>,
}

/// Operator-facing view of a resolved account.
#[derive(Debug, Serialize)]
pub struct ResolvedCredential<'a> {
    pub safe_name: &'a str,
    pub user_name: &'a str,
    pub address: &'a str,
    pub database: &'a str,
    pub password: &'a str,
}

impl GetOrCreateOutcome {
    pub fn credentials(&self) -> Vec<ResolvedCredential<'_>> {
        self.accounts
            .iter()
            .map(|spec| ResolvedCredential {
                safe_name: &spec.safe_name,
                user_name: &spec.user_name,
                address: &spec.address,
                database: &spec.database,
                password: spec.password.expose_secret(),
            })
            .collect()
    }
}
