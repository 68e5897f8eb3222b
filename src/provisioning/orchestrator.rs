//! Concurrent bulk account creation.
//!
//! One task per account on the current runtime, with the number of vault
//! calls in flight capped by a semaphore. A failed or panicked task is
//! recorded as a failure of its own account and never disturbs the others.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn, Instrument};

use crate::accounts::AccountSetBuilder;
use crate::domain::{
    AccountSpec, CreatedAccount, CreationOutcome, DeploymentRequest, FailedAccount,
    ProvisioningReport,
};
use crate::errors::{Error, Result};
use crate::vault::{VaultClient, VaultError, VaultResponse};

pub struct ProvisioningOrchestrator {
    vault: Arc<dyn VaultClient>,
    builder: AccountSetBuilder,
    limiter: Arc<Semaphore>,
}

impl ProvisioningOrchestrator {
    pub fn new(
        vault: Arc<dyn VaultClient>,
        builder: AccountSetBuilder,
        max_concurrent_creates: usize,
    ) -> Self {
        Self { vault, builder, limiter: Arc::new(Semaphore::new(max_concurrent_creates.max(1))) }
    }

    /// Build the deployment's account set and create every account.
    ///
    /// Building fails fast (unknown catalog keys, unreachable vault during
    /// safe resolution); creation failures are collected in the report.
    pub async fn create_all(&self, request: &DeploymentRequest) -> Result<ProvisioningReport> {
        let span = crate::provision_span!(
            "create_all",
            ecosystem = %request.ecosystem(),
            zone = %request.zone(),
            env = %request.env()
        );

        async {
            let specs = self.builder.build(request).await?;
            Ok::<_, Error>(self.create_specs(specs).await)
        }
        .instrument(span)
        .await
    }

    /// Create an already built account set.
    pub async fn create_specs(&self, specs: Vec<AccountSpec>) -> ProvisioningReport {
        let mut tasks = JoinSet::new();

        for (index, spec) in specs.iter().cloned().enumerate() {
            let vault = Arc::clone(&self.vault);
            let limiter = Arc::clone(&self.limiter);
            let span = crate::vault_span!("create_account", spec.safe_name, spec.user_name);

            tasks.spawn(
                async move {
                    let result = match limiter.acquire_owned().await {
                        Ok(_permit) => vault.create_account(&spec).await,
                        Err(_) => Err(VaultError::transport("creation limiter closed")),
                    };
                    (index, result)
                }
                .instrument(span),
            );
        }

        let mut outcomes: Vec<Option<CreationOutcome>> = vec![None; specs.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => outcomes[index] = Some(classify(&specs[index], result)),
                Err(e) => error!(error = %e, "Account creation task did not complete"),
            }
        }

        let mut report = ProvisioningReport::default();
        for (spec, outcome) in specs.iter().zip(outcomes) {
            let outcome = outcome.unwrap_or_else(|| {
                CreationOutcome::Failed(format!(
                    "Error creating account: creation task did not complete - {}",
                    spec
                ))
            });

            match outcome {
                CreationOutcome::Created(info) => report.succeeded.push(CreatedAccount {
                    info,
                    password: spec.password.clone(),
                    already_existed: false,
                }),
                CreationOutcome::ConflictExisting(info) => {
                    info!(safe = %spec.safe_name, user = %spec.user_name, "Account already exists");
                    report.succeeded.push(CreatedAccount {
                        info,
                        password: spec.password.clone(),
                        already_existed: true,
                    });
                }
                CreationOutcome::Failed(message) => {
                    warn!(
                        safe = %spec.safe_name,
                        user = %spec.user_name,
                        error = %message,
                        "Account creation failed"
                    );
                    report.failed.push(FailedAccount {
                        safe_name: spec.safe_name.clone(),
                        user_name: spec.user_name.clone(),
                        message,
                    });
                }
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Account creation finished"
        );

        report
    }
}

/// Classify one vault answer.
///
/// Messages render the spec through its `Display` impl, which leaves the
/// password out.
pub fn classify(
    spec: &AccountSpec,
    result: std::result::Result<VaultResponse, VaultError>,
) -> CreationOutcome {
    let response = match result {
        Ok(response) => response,
        Err(e) => return CreationOutcome::Failed(format!("Error creating account: {} - {}", e, spec)),
    };

    if let Some(message) = response.error_message() {
        return CreationOutcome::Failed(format!(
            "{} - status_code: {} : {}",
            message,
            response.status_label(),
            spec
        ));
    }

    match response.account_info() {
        (info, true) => CreationOutcome::ConflictExisting(info),
        (info, false) => CreationOutcome::Created(info),
    }
}
