use crate::iam::DEFAULT_TRUST_DOMAIN;
use crate::postgres::Credentials;
use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    pub iam: Iam,
    pub grants: Grants,
    /// Role memberships every synchronized role must hold.
    #[serde(default)]
    pub static_roles: Vec<String>,
    /// Administrative login per host. A list of tables rather than a
    /// host-keyed map: dotted hostnames as keys would collide with the
    /// config source's key-path separator.
    #[serde(default)]
    pub credentials: Vec<HostCredential>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Iam {
    /// Deployment region used in generated resource locators.
    pub region: String,
    /// Account owning the database hosts.
    pub account_id: String,
    /// Format-version tag for generated policy documents.
    pub policy_version: String,
    /// Trust domain suffix for derived principal keys.
    pub trust_domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grants {
    /// Prefix prepended to the principal name to form the database role.
    pub role_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostCredential {
    pub host: String,
    pub user: String,
    pub password: String,
}

impl Default for Iam {
    fn default() -> Self {
        Self {
            region: "eu-west-1".to_string(),
            account_id: "000000000000".to_string(),
            policy_version: "2012-10-17".to_string(),
            trust_domain: DEFAULT_TRUST_DOMAIN.to_string(),
        }
    }
}

impl Default for Grants {
    fn default() -> Self {
        Self {
            role_prefix: "iam_developer_".to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("iam.region", Iam::default().region)
            .into_diagnostic()?
            .set_default("iam.account_id", Iam::default().account_id)
            .into_diagnostic()?
            .set_default("iam.policy_version", Iam::default().policy_version)
            .into_diagnostic()?
            .set_default("iam.trust_domain", Iam::default().trust_domain)
            .into_diagnostic()?
            .set_default("grants.role_prefix", Grants::default().role_prefix)
            .into_diagnostic()?;

        // Optional file
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment overrides: PERIGEE__GRANTS__ROLE_PREFIX=iam_ops_, etc.
        builder = builder.add_source(config::Environment::with_prefix("PERIGEE").separator("__"));

        let cfg = builder.build().into_diagnostic()?;
        let s: Settings = cfg.try_deserialize().into_diagnostic()?;
        Ok(s)
    }

    /// The credentials list as the host-keyed lookup the grant engine uses.
    pub fn host_credentials(&self) -> BTreeMap<String, Credentials> {
        self.credentials
            .iter()
            .map(|c| {
                (
                    c.host.clone(),
                    Credentials {
                        name: c.user.clone(),
                        password: c.password.clone(),
                    },
                )
            })
            .collect()
    }

    /// Grant-engine view of this configuration.
    pub fn sync_config(&self) -> crate::grants::SyncConfig {
        crate::grants::SyncConfig {
            host_credentials: self.host_credentials(),
            static_roles: self.static_roles.clone(),
        }
    }
}
