//! REST vault client.
//!
//! Talks JSON over HTTPS to the vault's account API, optionally
//! authenticating with a client certificate. Business failures (non-2xx
//! answers carrying an `ErrorMessage`) are handed back as [`VaultResponse`]s;
//! only connectivity problems and undecodable bodies become errors.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::client::{AccountQuery, VaultClient, VaultResponse, ERROR_MESSAGE_FIELD};
use super::error::{Result, VaultError};
use crate::config::VaultSettings;
use crate::domain::{AccountSpec, SecretString};

/// Account creation payload. The only place a password leaves the process.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountBody<'a> {
    safe_name: &'a str,
    account_type: &'a str,
    user_name: &'a str,
    role: &'a str,
    comment: &'a str,
    address: &'a str,
    env: &'a str,
    env_letter: char,
    port: &'a str,
    database: &'a str,
    password: &'a str,
}

impl<'a> From<&'a AccountSpec> for CreateAccountBody<'a> {
    fn from(spec: &'a AccountSpec) -> Self {
        Self {
            safe_name: &spec.safe_name,
            account_type: &spec.account_type,
            user_name: &spec.user_name,
            role: &spec.role,
            comment: &spec.comment,
            address: &spec.address,
            env: &spec.env,
            env_letter: spec.env_letter,
            port: &spec.port,
            database: &spec.database,
            password: spec.password.expose_secret(),
        }
    }
}

#[derive(Deserialize)]
struct PasswordBody {
    password: String,
}

/// Vault client over the REST API.
#[derive(Debug, Clone)]
pub struct HttpVaultClient {
    client: Client,
    base_url: Url,
}

impl HttpVaultClient {
    /// Build a client from settings, loading the client certificate when one
    /// is configured.
    pub fn new(settings: &VaultSettings) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| VaultError::config(format!("Invalid vault base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(VaultError::config(format!(
                "Vault base URL cannot be a base: {}",
                settings.base_url
            )));
        }

        let mut builder = Client::builder().timeout(settings.timeout());

        if let (Some(cert_path), Some(key_path)) =
            (&settings.client_cert_path, &settings.client_key_path)
        {
            let mut pem = std::fs::read(cert_path).map_err(|e| {
                VaultError::config(format!("Cannot read {}: {}", cert_path.display(), e))
            })?;
            pem.push(b'\n');
            pem.extend(std::fs::read(key_path).map_err(|e| {
                VaultError::config(format!("Cannot read {}: {}", key_path.display(), e))
            })?);

            let identity = reqwest::Identity::from_pem(&pem)
                .map_err(|e| VaultError::config(format!("Invalid client identity: {}", e)))?;
            builder = builder.identity(identity);
        }

        let client = builder
            .build()
            .map_err(|e| VaultError::config(format!("Failed to build HTTP client: {}", e)))?;

        debug!(base_url = %base_url, environment = %settings.environment, "Vault client ready");

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| VaultError::config("Vault base URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn account_url(&self, query: &AccountQuery) -> Result<Url> {
        let mut url =
            self.endpoint(&["zones", &query.zone, "safes", &query.safe_name, "accounts"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("userName", &query.user_name);
            pairs.append_pair("address", &query.address);
            if let Some(database) = &query.database {
                pairs.append_pair("database", database);
            }
        }
        Ok(url)
    }

    async fn into_vault_response(response: Response) -> Result<VaultResponse> {
        let status = response.status();
        let bytes = response.bytes().await?;
        let content = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| {
                VaultError::invalid_response(format!("HTTP {} with undecodable body: {}", status, e))
            })?
        };

        Ok(VaultResponse::new(Some(status.as_u16()), content))
    }

    async fn rejection(response: Response) -> VaultError {
        let status = response.status();
        let message = match response.json::<Value>().await {
            Ok(body) => body
                .get(ERROR_MESSAGE_FIELD)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };
        VaultError::Rejected { message, status: Some(status.as_u16()) }
    }
}

#[async_trait]
impl VaultClient for HttpVaultClient {
    #[instrument(skip(self, query), fields(safe = %query.safe_name, user = %query.user_name))]
    async fn get_account(&self, query: &AccountQuery) -> Result<Option<SecretString>> {
        let response = self.client.get(self.account_url(query)?).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body: PasswordBody = response.json().await?;
                Ok(Some(SecretString::new(body.password)))
            }
            _ => Err(Self::rejection(response).await),
        }
    }

    #[instrument(skip(self, spec), fields(safe = %spec.safe_name, user = %spec.user_name))]
    async fn create_account(&self, spec: &AccountSpec) -> Result<VaultResponse> {
        let url = self.endpoint(&["zones", &spec.zone, "accounts"])?;
        let response =
            self.client.post(url).json(&CreateAccountBody::from(spec)).send().await?;

        debug!(status = %response.status(), "Create account answered");
        Self::into_vault_response(response).await
    }

    #[instrument(skip(self))]
    async fn get_safe_detail(&self, safe_name: &str, zone: &str) -> Result<Option<Value>> {
        let url = self.endpoint(&["zones", zone, "safes", safe_name])?;
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            _ => Err(Self::rejection(response).await),
        }
    }

    #[instrument(skip(self, query), fields(safe = %query.safe_name, user = %query.user_name))]
    async fn delete_account(&self, query: &AccountQuery) -> Result<VaultResponse> {
        let response = self.client.delete(self.account_url(query)?).send().await?;
        Self::into_vault_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> HttpVaultClient {
        let settings = VaultSettings { base_url: base_url.to_string(), ..VaultSettings::default() };
        HttpVaultClient::new(&settings).unwrap()
    }

    #[test]
    fn test_account_url_encodes_query() {
        let client = client("https://vault.local/api/");
        let query = AccountQuery {
            zone: "EU1".into(),
            safe_name: "EU1-MYAPP--PRD-GEN".into(),
            user_name: "1moAPPmyappP".into(),
            address: "db host".into(),
            database: Some("db1".into()),
        };

        let url = client.account_url(&query).unwrap();
        assert_eq!(url.path(), "/api/zones/EU1/safes/EU1-MYAPP--PRD-GEN/accounts");
        assert_eq!(url.query(), Some("userName=1moAPPmyappP&address=db+host&database=db1"));
    }

    #[test]
    fn test_account_url_without_database() {
        let client = client("https://vault.local/api");
        let query = AccountQuery {
            zone: "EU1".into(),
            safe_name: "S".into(),
            user_name: "u".into(),
            address: "a".into(),
            database: None,
        };
        assert_eq!(client.account_url(&query).unwrap().query(), Some("userName=u&address=a"));
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let settings = VaultSettings { base_url: "not a url".into(), ..VaultSettings::default() };
        assert!(matches!(HttpVaultClient::new(&settings), Err(VaultError::Config { .. })));
    }

    #[test]
    fn test_missing_identity_files_are_config_errors() {
        let settings = VaultSettings {
            client_cert_path: Some("/nonexistent/client.pem".into()),
            client_key_path: Some("/nonexistent/client.key".into()),
            ..VaultSettings::default()
        };
        assert!(matches!(HttpVaultClient::new(&settings), Err(VaultError::Config { .. })));
    }
}
