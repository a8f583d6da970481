//! The per-principal synchronization run.

use crate::access::{database_schemas, HostAccess, PrincipalSpec};
use crate::errors::{ErrorSet, GrantError};
use crate::grants::connect::{close_connections, connect_to_hosts};
use crate::grants::resolve::AccessResolver;
use crate::grants::Granter;
use crate::postgres::{Connector, RoleSynchronizer};
use futures::future::join_all;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

impl<R, C, S> Granter<R, C, S>
where
    R: AccessResolver,
    C: Connector,
    S: RoleSynchronizer<C::Connection>,
{
    /// Synchronize a principal's database access across every host named by
    /// its read/write specifications.
    ///
    /// Stages run linearly: resolve, connect, synchronize, close. Only a
    /// total resolution failure aborts early; per-host connection and
    /// synchronization failures are aggregated into the returned error while
    /// the remaining hosts proceed. Close failures are logged, never folded
    /// into the returned error.
    pub async fn sync_user(
        &self,
        namespace: &str,
        role_prefix: &str,
        user: &PrincipalSpec,
    ) -> Result<(), GrantError> {
        let role = format!("{}{}", role_prefix, user.name);
        info!(user = %user.name, role = %role, "syncing user");

        let (accesses, resolve_errs) = self
            .resolver
            .resolve(namespace, &user.read, &user.write)
            .await;
        if !resolve_errs.is_empty() {
            if accesses.is_empty() {
                return Err(GrantError::Resolve {
                    source: Box::new(GrantError::Aggregate(resolve_errs)),
                });
            }
            warn!(
                error = %resolve_errs,
                "some access requests could not be resolved, continuing with the resolved ones"
            );
        }
        info!(hosts = accesses.len(), "resolved access requests");

        let (connections, mut errs) =
            connect_to_hosts(&self.connector, &accesses, &self.config.host_credentials).await;

        errs.merge(self.set_roles_on_hosts(&role, &accesses, &connections).await);

        // teardown runs regardless of the synchronization outcome
        let close_errs = close_connections(&self.connector, connections).await;
        if !close_errs.is_empty() {
            error!(error = %close_errs, "failed to close connections to hosts");
        }

        errs.into_result()
    }

    /// Converge the role on every host that has a live connection, fanning
    /// the hosts out as independent concurrent runs.
    async fn set_roles_on_hosts(
        &self,
        role: &str,
        accesses: &HostAccess,
        connections: &BTreeMap<String, C::Connection>,
    ) -> ErrorSet {
        let runs = connections.iter().map(|(host, connection)| async move {
            let schemas = accesses
                .get(host)
                .map(|access| database_schemas(access))
                .unwrap_or_default();
            info!(host = %host, role = %role, grants = schemas.len(), "synchronizing role");
            let result = self
                .synchronizer
                .synchronize_role(connection, role, &self.config.static_roles, &schemas)
                .await;
            (host.clone(), result)
        });

        let mut errs = ErrorSet::new();
        for (host, result) in join_all(runs).await {
            if let Err(err) = result {
                errs.push(host, err);
            }
        }
        errs
    }
}
