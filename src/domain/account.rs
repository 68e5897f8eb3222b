//! Account specifications and the enumerations used to derive them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::secret::SecretString;
use crate::errors::{Error, Result};

/// A fixed purpose served by one of the mandatory accounts of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountFunctionCategory {
    Generic,
    Service,
    Monitoring,
    Reconcile,
}

impl AccountFunctionCategory {
    pub const ALL: [AccountFunctionCategory; 4] = [
        AccountFunctionCategory::Generic,
        AccountFunctionCategory::Service,
        AccountFunctionCategory::Monitoring,
        AccountFunctionCategory::Reconcile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "GENERIC",
            Self::Service => "SERVICE",
            Self::Monitoring => "MONITORING",
            Self::Reconcile => "RECONCILE",
        }
    }
}

impl FromStr for AccountFunctionCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        AccountFunctionCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::config(format!("Unknown account category '{}'", s)))
    }
}

impl fmt::Display for AccountFunctionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which of the two deployment safes an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SafePolicy {
    #[serde(rename = "GEN", alias = "generic")]
    Generic,
    #[serde(rename = "SERVICE", alias = "service")]
    Service,
}

impl SafePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "GEN",
            Self::Service => "SERVICE",
        }
    }
}

impl fmt::Display for SafePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The generic and service safes of one (ecosystem, zone, env).
///
/// `service` equals `generic` when the deployment has no dedicated service safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeNamePair {
    pub generic: String,
    pub service: String,
}

impl SafeNamePair {
    pub fn for_policy(&self, policy: SafePolicy) -> &str {
        match policy {
            SafePolicy::Generic => &self.generic,
            SafePolicy::Service => &self.service,
        }
    }

    /// Whether a dedicated service safe was found.
    pub fn has_dedicated_service(&self) -> bool {
        self.generic != self.service
    }
}

/// Everything the vault needs to create one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSpec {
    pub safe_name: String,
    pub account_type: String,
    pub user_name: String,
    pub role: String,
    pub comment: String,
    pub zone: String,
    pub address: String,
    pub env: String,
    pub env_letter: char,
    pub port: String,
    pub database: String,
    pub password: SecretString,
}

impl fmt::Display for AccountSpec {
    /// Human-readable rendering used in error text. The password is left out.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{safe_name: {}, account_type: {}, user_name: {}, role: {}, comment: {}, zone: {}, \
             address: {}, env: {}, env_letter: {}, port: {}, database: {}}}",
            self.safe_name,
            self.account_type,
            self.user_name,
            self.role,
            self.comment,
            self.zone,
            self.address,
            self.env,
            self.env_letter,
            self.port,
            self.database
        )
    }
}
