//! Multi-host grant synchronization: resolve a principal's declarative
//! accesses, connect to every host involved, and converge the database role
//! on each one, aggregating per-host failures instead of aborting the run.

pub mod connect;
pub mod resolve;
pub mod sync;

use crate::postgres::Credentials;
use std::collections::BTreeMap;

/// Process-wide grant configuration.
///
/// Loaded once at startup and read-only for the process lifetime; shared by
/// every per-principal run, so concurrent reads are safe by construction.
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Administrative login per host.
    pub host_credentials: BTreeMap<String, Credentials>,
    /// Role memberships every synchronized role must hold, independent of
    /// its specific access grants.
    pub static_roles: Vec<String>,
}

/// Orchestrates grant synchronization for one principal at a time across the
/// resolver, connector and role-synchronizer seams.
pub struct Granter<R, C, S> {
    pub resolver: R,
    pub connector: C,
    pub synchronizer: S,
    pub config: SyncConfig,
}

impl<R, C, S> Granter<R, C, S> {
    pub fn new(resolver: R, connector: C, synchronizer: S, config: SyncConfig) -> Self {
        Self {
            resolver,
            connector,
            synchronizer,
            config,
        }
    }
}
