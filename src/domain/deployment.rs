//! Deployment descriptor and the closed enumerations it is keyed by.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{Error, Result};

/// Environment tier of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Environment {
    Dev,
    Int,
    Uat,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 4] =
        [Environment::Dev, Environment::Int, Environment::Uat, Environment::Prod];

    /// Upper-cased name, as stamped on every account.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "DEV",
            Self::Int => "INT",
            Self::Uat => "UAT",
            Self::Prod => "PROD",
        }
    }

    /// First letter of the environment, upper-cased.
    pub fn letter(&self) -> char {
        match self {
            Self::Dev => 'D',
            Self::Int => 'I',
            Self::Uat => 'U',
            Self::Prod => 'P',
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Environment::ALL
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::config(format!("Unknown environment '{}'", s)))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Database technology of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Technology {
    Mongodb,
    Oracle,
    Postgresql,
    Mysql,
}

impl Technology {
    pub const ALL: [Technology; 4] =
        [Technology::Mongodb, Technology::Oracle, Technology::Postgresql, Technology::Mysql];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mongodb => "mongodb",
            Self::Oracle => "oracle",
            Self::Postgresql => "postgresql",
            Self::Mysql => "mysql",
        }
    }

    /// The two-letter fragment embedded in generated usernames.
    pub fn short_code(&self) -> &'static str {
        &self.as_str()[..2]
    }

    /// Prefix of the vault account type (`MONGODB`, `ORACLE`, ...).
    pub fn account_type_prefix(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl FromStr for Technology {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Technology::ALL
            .into_iter()
            .find(|techno| techno.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::config(format!("Unknown technology '{}'", s)))
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw, unvalidated deployment input as received from the CLI or a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DeploymentDescriptor {
    #[validate(length(min = 1, message = "Ecosystem cannot be empty"))]
    pub ecosystem: String,

    #[validate(length(min = 1, message = "Zone cannot be empty"))]
    pub zone: String,

    #[validate(length(min = 1, message = "Address cannot be empty"))]
    pub address: String,

    pub env: String,

    pub port: String,

    pub database: String,

    pub techno: String,

    #[serde(default)]
    pub schemas: Vec<String>,

    #[serde(default)]
    pub admins: Vec<String>,
}

/// A validated deployment, constructed once per provisioning call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentRequest {
    ecosystem: String,
    zone: String,
    address: String,
    env: Environment,
    port: String,
    database: String,
    techno: Technology,
    schemas: Vec<String>,
    admins: Vec<String>,
}

impl TryFrom<DeploymentDescriptor> for DeploymentRequest {
    type Error = Error;

    fn try_from(descriptor: DeploymentDescriptor) -> Result<Self> {
        descriptor.validate()?;

        Ok(Self {
            env: descriptor.env.parse()?,
            techno: descriptor.techno.parse()?,
            ecosystem: descriptor.ecosystem,
            zone: descriptor.zone,
            address: descriptor.address,
            port: descriptor.port,
            database: descriptor.database,
            schemas: descriptor.schemas,
            admins: descriptor.admins,
        })
    }
}

impl DeploymentRequest {
    /// Build a request from its mandatory fields; schemas and admins start empty.
    pub fn new(
        ecosystem: impl Into<String>,
        zone: impl Into<String>,
        address: impl Into<String>,
        env: &str,
        port: impl Into<String>,
        database: impl Into<String>,
        techno: &str,
    ) -> Result<Self> {
        DeploymentDescriptor {
            ecosystem: ecosystem.into(),
            zone: zone.into(),
            address: address.into(),
            env: env.to_string(),
            port: port.into(),
            database: database.into(),
            techno: techno.to_string(),
            schemas: Vec::new(),
            admins: Vec::new(),
        }
        .try_into()
    }

    pub fn with_schemas<I, S>(mut self, schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schemas = schemas.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_admins<I, S>(mut self, admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.admins = admins.into_iter().map(Into::into).collect();
        self
    }

    pub fn ecosystem(&self) -> &str {
        &self.ecosystem
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn env(&self) -> Environment {
        self.env
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn techno(&self) -> Technology {
        self.techno
    }

    pub fn schemas(&self) -> &[String] {
        &self.schemas
    }

    pub fn admins(&self) -> &[String] {
        &self.admins
    }
}
