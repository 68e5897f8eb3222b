//! # Command Line Interface
//!
//! `safeprov` provisions the vault accounts of a deployment, or inspects and
//! removes single accounts. Results are printed on stdout (JSON by default);
//! logs go to stderr.

pub mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::config::{load_catalog, load_config, AppConfig};
use crate::domain::{DeploymentDescriptor, DeploymentRequest};
use crate::naming::ZonePrefixedShortName;
use crate::observability::{init_logging, log_config_info};
use crate::services::CredentialService;
use crate::vault::{AccountQuery, HttpVaultClient, InMemoryVault, VaultClient};

use output::{print_output, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "safeprov")]
#[command(about = "Provision database service accounts into the credentials vault")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (YAML or TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog file overriding the built-in naming tables
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Use an in-process vault instead of the configured one
    #[arg(long, global = true)]
    pub in_memory: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create every account of a deployment concurrently
    Create(DeploymentArgs),

    /// Reuse existing passwords and create missing accounts, one at a time
    GetOrCreate(DeploymentArgs),

    /// Show the accounts a deployment would get, without creating them
    Plan(DeploymentArgs),

    /// Fetch the password of one account
    Get(AccountArgs),

    /// Delete one account
    Delete(AccountArgs),
}

/// A deployment, given as a descriptor file or as flags.
#[derive(Args, Debug, Clone)]
pub struct DeploymentArgs {
    /// Deployment descriptor file (YAML or JSON)
    #[arg(short, long, conflicts_with_all = ["ecosystem", "zone", "address", "env", "port", "database", "techno"])]
    pub descriptor: Option<PathBuf>,

    #[arg(long, required_unless_present = "descriptor")]
    pub ecosystem: Option<String>,

    #[arg(long, required_unless_present = "descriptor")]
    pub zone: Option<String>,

    /// Database host address
    #[arg(long, required_unless_present = "descriptor")]
    pub address: Option<String>,

    /// Environment tier (DEV, INT, UAT, PROD)
    #[arg(long, required_unless_present = "descriptor")]
    pub env: Option<String>,

    #[arg(long, required_unless_present = "descriptor")]
    pub port: Option<String>,

    #[arg(long, required_unless_present = "descriptor")]
    pub database: Option<String>,

    /// Database technology (mongodb, oracle, postgresql, mysql)
    #[arg(long, required_unless_present = "descriptor")]
    pub techno: Option<String>,

    /// Schema account name (repeatable)
    #[arg(long = "schema")]
    pub schemas: Vec<String>,

    /// Named admin account (repeatable)
    #[arg(long = "admin")]
    pub admins: Vec<String>,
}

impl DeploymentArgs {
    pub fn into_request(self) -> anyhow::Result<DeploymentRequest> {
        let mut descriptor = match &self.descriptor {
            Some(path) => read_descriptor(path)?,
            None => DeploymentDescriptor {
                ecosystem: self.ecosystem.unwrap_or_default(),
                zone: self.zone.unwrap_or_default(),
                address: self.address.unwrap_or_default(),
                env: self.env.unwrap_or_default(),
                port: self.port.unwrap_or_default(),
                database: self.database.unwrap_or_default(),
                techno: self.techno.unwrap_or_default(),
                schemas: Vec::new(),
                admins: Vec::new(),
            },
        };

        descriptor.schemas.extend(self.schemas);
        descriptor.admins.extend(self.admins);

        Ok(DeploymentRequest::try_from(descriptor)?)
    }
}

fn read_descriptor(path: &Path) -> anyhow::Result<DeploymentDescriptor> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read descriptor {}", path.display()))?;
    serde_yaml::from_str(&raw).with_context(|| format!("Invalid descriptor {}", path.display()))
}

/// One vault account.
#[derive(Args, Debug, Clone)]
pub struct AccountArgs {
    #[arg(long)]
    pub zone: String,

    #[arg(long)]
    pub safe: String,

    #[arg(long)]
    pub user: String,

    #[arg(long)]
    pub address: String,

    #[arg(long)]
    pub database: Option<String>,
}

impl From<AccountArgs> for AccountQuery {
    fn from(args: AccountArgs) -> Self {
        Self {
            zone: args.zone,
            safe_name: args.safe,
            user_name: args.user,
            address: args.address,
            database: args.database,
        }
    }
}

#[derive(Serialize)]
struct LookupOutput<'a> {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
}

#[derive(Serialize)]
struct GetOrCreateOutput<'a> {
    password_created: bool,
    accounts: Vec<crate::domain::ResolvedCredential<'a>>,
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    run(Cli::parse()).await
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(catalog) = &cli.catalog {
        config.provisioning.catalog_path = Some(catalog.clone());
    }

    init_logging(&config.observability, cli.verbose)?;
    log_config_info(&config);

    let service = build_service(&config, cli.in_memory)?;
    execute(&service, cli.command, cli.output).await
}

fn build_service(config: &AppConfig, in_memory: bool) -> anyhow::Result<CredentialService> {
    let catalog = Arc::new(load_catalog(&config.provisioning)?);
    let vault: Arc<dyn VaultClient> = if in_memory {
        tracing::warn!("Using in-memory vault; nothing is persisted");
        Arc::new(InMemoryVault::new())
    } else {
        Arc::new(HttpVaultClient::new(&config.vault).context("Failed to create vault client")?)
    };

    Ok(CredentialService::new(vault, catalog, Arc::new(ZonePrefixedShortName), &config.provisioning))
}

async fn execute(
    service: &CredentialService,
    command: Commands,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        Commands::Create(args) => {
            let request = args.into_request()?;
            let report = service.create_accounts(&request).await?;
            print_output(&report, format)?;
            report.into_result().into_error()?;
        }
        Commands::GetOrCreate(args) => {
            let request = args.into_request()?;
            let outcome = service.get_password_or_create_accounts(&request).await?;
            let output = GetOrCreateOutput {
                password_created: outcome.password_created,
                accounts: outcome.credentials(),
            };
            print_output(&output, format)?;
        }
        Commands::Plan(args) => {
            let request = args.into_request()?;
            let specs = service.plan(&request).await?;
            print_output(&specs, format)?;
        }
        Commands::Get(args) => {
            let password = service.get_account(&args.into()).await?;
            let output = LookupOutput {
                found: password.is_some(),
                password: password.as_ref().map(|p| p.expose_secret()),
            };
            print_output(&output, format)?;
        }
        Commands::Delete(args) => {
            let response = service.delete_account(&args.into()).await?;
            print_output(&response, format)?;
            if let Some(message) = response.error_message() {
                anyhow::bail!("{} - status_code: {}", message, response.status_label());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_with_flags() {
        let cli = Cli::try_parse_from([
            "safeprov", "create", "--ecosystem", "myapp", "--zone", "EU1", "--address", "db.local",
            "--env", "prod", "--port", "27017", "--database", "db1", "--techno", "mongodb",
            "--schema", "orders", "--schema", "billing", "--admin", "dba1",
        ])
        .unwrap();

        let Commands::Create(args) = cli.command else { panic!("expected create") };
        let request = args.into_request().unwrap();
        assert_eq!(request.schemas(), ["orders", "billing"]);
        assert_eq!(request.admins(), ["dba1"]);
        assert_eq!(request.env().as_str(), "PROD");
    }

    #[test]
    fn test_missing_flags_are_rejected() {
        assert!(Cli::try_parse_from(["safeprov", "plan", "--ecosystem", "myapp"]).is_err());
    }

    #[test]
    fn test_descriptor_file() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        std::fs::write(
            file.path(),
            "ecosystem: myapp\nzone: EU1\naddress: h\nenv: DEV\nport: '1521'\n\
             database: ORCL\ntechno: oracle\nschemas: [app]\n",
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["safeprov", "--in-memory", "plan", "-d", path, "--admin", "dba"])
            .unwrap();
        assert!(cli.in_memory);

        let Commands::Plan(args) = cli.command else { panic!("expected plan") };
        let request = args.into_request().unwrap();
        assert_eq!(request.schemas(), ["app"]);
        assert_eq!(request.admins(), ["dba"]);
    }

    #[test]
    fn test_unknown_technology_is_rejected() {
        let cli = Cli::try_parse_from([
            "safeprov", "plan", "--ecosystem", "a", "--zone", "EU1", "--address", "h", "--env",
            "DEV", "--port", "1", "--database", "d", "--techno", "cassandra",
        ])
        .unwrap();
        let Commands::Plan(args) = cli.command else { panic!("expected plan") };
        assert!(args.into_request().is_err());
    }

    #[tokio::test]
    async fn test_in_memory_create_runs() {
        let config = AppConfig::default();
        let service = build_service(&config, true).unwrap();
        let cli = Cli::try_parse_from([
            "safeprov", "create", "--ecosystem", "a", "--zone", "EU1", "--address", "h", "--env",
            "DEV", "--port", "1", "--database", "d", "--techno", "oracle",
        ])
        .unwrap();

        execute(&service, cli.command, OutputFormat::Json).await.unwrap();
    }
}
