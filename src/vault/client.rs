//! Core vault client trait and wire-level types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::Result;
use crate::domain::{AccountInfo, AccountSpec, SecretString};

/// Field the vault uses to report an error inside a response body.
pub const ERROR_MESSAGE_FIELD: &str = "ErrorMessage";

/// Field holding the list of existing accounts in an "already exists" body.
pub const CONFLICT_VALUE_FIELD: &str = "value";

/// Identifies a single account in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountQuery {
    pub zone: String,
    pub safe_name: String,
    pub user_name: String,
    pub address: String,
    pub database: Option<String>,
}

impl From<&AccountSpec> for AccountQuery {
    fn from(spec: &AccountSpec) -> Self {
        Self {
            zone: spec.zone.clone(),
            safe_name: spec.safe_name.clone(),
            user_name: spec.user_name.clone(),
            address: spec.address.clone(),
            database: Some(spec.database.clone()),
        }
    }
}

/// Body and status code of a vault write (create/delete).
///
/// Non-2xx answers are not transport errors: the vault reports business
/// failures in the body under [`ERROR_MESSAGE_FIELD`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultResponse {
    pub status_code: Option<u16>,
    pub content: Value,
}

impl VaultResponse {
    pub fn new(status_code: Option<u16>, content: Value) -> Self {
        Self { status_code, content }
    }

    /// The vault's error message, if the body carries one.
    pub fn error_message(&self) -> Option<&str> {
        self.content.get(ERROR_MESSAGE_FIELD).and_then(Value::as_str)
    }

    /// Status code rendered for messages, `unknown` when absent.
    pub fn status_label(&self) -> String {
        self.status_code.map_or_else(|| "unknown".to_string(), |code| code.to_string())
    }

    /// Account record carried by a successful answer.
    ///
    /// Returns the first element of the `value` list ("already exists" shape)
    /// with `true`, otherwise the body itself with `false`. A body that is not
    /// an object (empty 201/204) yields an empty record.
    pub fn account_info(&self) -> (AccountInfo, bool) {
        if let Some(info) = self
            .content
            .get(CONFLICT_VALUE_FIELD)
            .and_then(Value::as_array)
            .and_then(|existing| existing.first())
            .and_then(Value::as_object)
        {
            return (info.clone(), true);
        }

        (self.content.as_object().cloned().unwrap_or_default(), false)
    }

    /// Whether the vault reported the account as already present.
    pub fn already_exists(&self) -> bool {
        self.account_info().1
    }
}

/// Vault operations used by the provisioning engine.
///
/// Implementations must be `Send + Sync` so they can be shared across the
/// creation tasks as `Arc<dyn VaultClient>`. Implementations MUST NOT log
/// passwords.
#[async_trait]
pub trait VaultClient: Send + Sync {
    /// Fetch the password of an account, `None` if the account does not exist.
    async fn get_account(&self, query: &AccountQuery) -> Result<Option<SecretString>>;

    /// Create an account. Business failures come back as a response carrying
    /// an error message; transport failures as `Err`.
    async fn create_account(&self, spec: &AccountSpec) -> Result<VaultResponse>;

    /// Existence probe for a safe: `None` when the safe is absent.
    async fn get_safe_detail(&self, safe_name: &str, zone: &str) -> Result<Option<Value>>;

    /// Delete an account.
    async fn delete_account(&self, query: &AccountQuery) -> Result<VaultResponse>;

    /// Check if a safe exists.
    async fn safe_exists(&self, safe_name: &str, zone: &str) -> Result<bool> {
        Ok(self.get_safe_detail(safe_name, zone).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fresh_creation_shape() {
        let response = VaultResponse::new(Some(201), json!({ "id": "12_3", "userName": "svc" }));
        assert!(response.error_message().is_none());

        let (info, existed) = response.account_info();
        assert!(!existed);
        assert_eq!(info["id"], "12_3");
    }

    #[test]
    fn test_conflict_shape_takes_first_element() {
        let response = VaultResponse::new(
            Some(409),
            json!({ "value": [{ "id": "first" }, { "id": "second" }], "count": 2 }),
        );

        let (info, existed) = response.account_info();
        assert!(existed);
        assert_eq!(info["id"], "first");
    }

    #[test]
    fn test_bodies_without_record_still_succeed() {
        let response = VaultResponse::new(Some(409), json!({ "value": [] }));
        let (info, existed) = response.account_info();
        assert!(!existed);
        assert_eq!(info["value"], json!([]));

        let (info, existed) = VaultResponse::new(Some(201), Value::Null).account_info();
        assert!(info.is_empty());
        assert!(!existed);

        let (info, _) = VaultResponse::new(Some(201), json!("created")).account_info();
        assert!(info.is_empty());
    }

    #[test]
    fn test_error_shape() {
        let response = VaultResponse::new(None, json!({ "ErrorMessage": "Safe does not exist" }));
        assert_eq!(response.error_message(), Some("Safe does not exist"));
        assert_eq!(response.status_label(), "unknown");
    }
}
