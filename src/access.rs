//! Declarative access specifications and their resolved, host-grouped form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Desired accesses grouped by host.
///
/// Every host key present maps to a non-empty access list: the grouping
/// functions only ever insert lists with at least one entry, and the
/// connection layer relies on element zero for the login database. A
/// `BTreeMap` keeps host iteration stable so logs and aggregated errors come
/// out in a deterministic order.
pub type HostAccess = BTreeMap<String, Vec<ReadWriteAccess>>;

/// Root structure of the principals JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalsFile {
    pub users: Vec<PrincipalSpec>,
}

/// Declarative read/write access specification for one principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalSpec {
    /// Principal name; also the suffix of the database role.
    pub name: String,
    #[serde(default)]
    pub read: Vec<AccessSpec>,
    #[serde(default)]
    pub write: Vec<AccessSpec>,
}

/// One requested database access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessSpec {
    pub host: String,
    pub database: String,
    /// Schema to grant on; defaults to the database name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Free-form justification, carried for audit logging only.
    #[serde(default)]
    pub reason: Option<String>,
}

impl AccessSpec {
    pub fn schema_name(&self) -> &str {
        self.schema.as_deref().unwrap_or(&self.database)
    }
}

/// Read or write level of a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privilege {
    Read,
    Write,
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Privilege::Read => write!(f, "read"),
            Privilege::Write => write!(f, "write"),
        }
    }
}

/// Concrete grant target: one database/schema pair with its privilege level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    pub name: String,
    pub schema: String,
    pub privileges: Privilege,
}

/// A resolved access request on a single host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadWriteAccess {
    pub host: String,
    pub database: DatabaseSchema,
}

/// Flatten a host's resolved accesses into the grant targets handed to the
/// role synchronizer.
pub fn database_schemas(accesses: &[ReadWriteAccess]) -> Vec<DatabaseSchema> {
    accesses.iter().map(|a| a.database.clone()).collect()
}
