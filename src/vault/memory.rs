//! In-process vault used for dry runs and tests.
//!
//! Mimics the REST vault's answer shapes: a fresh creation returns the account
//! fields, a duplicate returns them under `value`, and injected rejections
//! return an `ErrorMessage` body with a status code.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use super::client::{AccountQuery, VaultClient, VaultResponse};
use super::error::{Result, VaultError};
use crate::domain::{AccountSpec, SecretString};

#[derive(Debug, Clone)]
struct StoredAccount {
    info: Value,
    password: SecretString,
}

/// Counts a creation as in flight until dropped, including when the calling
/// task is aborted mid-call.
struct InFlightGuard<'a> {
    in_flight: &'a AtomicUsize,
}

impl<'a> InFlightGuard<'a> {
    fn enter(in_flight: &'a AtomicUsize, max_in_flight: &AtomicUsize) -> Self {
        let current = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        max_in_flight.fetch_max(current, Ordering::SeqCst);
        Self { in_flight }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Thread-safe in-memory vault.
#[derive(Debug, Default)]
pub struct InMemoryVault {
    accounts: RwLock<HashMap<(String, String), StoredAccount>>,
    safes: RwLock<HashSet<String>>,
    transport_failures: HashSet<String>,
    rejections: HashMap<String, (String, u16)>,
    latency: Option<Duration>,
    next_id: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    create_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a safe so existence probes find it.
    pub fn with_safe(mut self, safe_name: impl Into<String>) -> Self {
        self.safes.get_mut().insert(safe_name.into());
        self
    }

    /// Seed an existing account.
    pub fn with_account(
        mut self,
        safe_name: impl Into<String>,
        user_name: impl Into<String>,
        password: impl Into<SecretString>,
    ) -> Self {
        let safe_name = safe_name.into();
        let user_name = user_name.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let info = json!({
            "id": format!("{}_{}", id, id),
            "safeName": safe_name,
            "userName": user_name,
        });
        self.accounts
            .get_mut()
            .insert((safe_name, user_name), StoredAccount { info, password: password.into() });
        self
    }

    /// Every call for this user name fails as if the vault were unreachable.
    pub fn with_transport_failure(mut self, user_name: impl Into<String>) -> Self {
        self.transport_failures.insert(user_name.into());
        self
    }

    /// Creations for this user name are answered with an error body.
    pub fn with_rejection(
        mut self,
        user_name: impl Into<String>,
        message: impl Into<String>,
        status: u16,
    ) -> Self {
        self.rejections.insert(user_name.into(), (message.into(), status));
        self
    }

    /// Simulated round-trip time of every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Highest number of creations observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Creations currently in progress.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Stored password of an account, if present.
    pub async fn stored_password(&self, safe_name: &str, user_name: &str) -> Option<SecretString> {
        self.accounts
            .read()
            .await
            .get(&(safe_name.to_string(), user_name.to_string()))
            .map(|account| account.password.clone())
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn check_transport(&self, user_name: &str) -> Result<()> {
        if self.transport_failures.contains(user_name) {
            return Err(VaultError::transport(format!("connection refused for {}", user_name)));
        }
        Ok(())
    }

    async fn store(&self, spec: &AccountSpec) -> VaultResponse {
        if let Some((message, status)) = self.rejections.get(&spec.user_name) {
            return VaultResponse::new(Some(*status), json!({ "ErrorMessage": message }));
        }

        let key = (spec.safe_name.clone(), spec.user_name.clone());
        let mut accounts = self.accounts.write().await;

        if let Some(existing) = accounts.get(&key) {
            return VaultResponse::new(
                Some(409),
                json!({ "value": [existing.info.clone()], "count": 1 }),
            );
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let info = json!({
            "id": format!("{}_{}", id, id),
            "safeName": spec.safe_name,
            "userName": spec.user_name,
            "address": spec.address,
            "platformId": spec.account_type,
            "createdTime": chrono::Utc::now().timestamp(),
        });
        accounts.insert(key, StoredAccount { info: info.clone(), password: spec.password.clone() });

        VaultResponse::new(Some(201), info)
    }
}

#[async_trait]
impl VaultClient for InMemoryVault {
    async fn get_account(&self, query: &AccountQuery) -> Result<Option<SecretString>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        self.check_transport(&query.user_name)?;

        Ok(self.stored_password(&query.safe_name, &query.user_name).await)
    }

    async fn create_account(&self, spec: &AccountSpec) -> Result<VaultResponse> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let _in_flight = InFlightGuard::enter(&self.in_flight, &self.max_in_flight);

        self.simulate_latency().await;
        self.check_transport(&spec.user_name)?;
        Ok(self.store(spec).await)
    }

    async fn get_safe_detail(&self, safe_name: &str, zone: &str) -> Result<Option<Value>> {
        self.simulate_latency().await;
        let safes = self.safes.read().await;
        Ok(safes.contains(safe_name).then(|| json!({ "safeName": safe_name, "location": zone })))
    }

    async fn delete_account(&self, query: &AccountQuery) -> Result<VaultResponse> {
        self.simulate_latency().await;
        self.check_transport(&query.user_name)?;

        let key = (query.safe_name.clone(), query.user_name.clone());
        match self.accounts.write().await.remove(&key) {
            Some(_) => Ok(VaultResponse::new(Some(204), Value::Null)),
            None => Ok(VaultResponse::new(
                Some(404),
                json!({ "ErrorMessage": format!("Account {} not found", query.user_name) }),
            )),
        }
    }
}
