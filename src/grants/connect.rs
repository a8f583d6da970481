//! Per-host connection management for a synchronization run.

use crate::access::HostAccess;
use crate::errors::{ErrorSet, GrantError};
use crate::postgres::{ConnectionString, Connector, Credentials};
use futures::future::join_all;
use std::collections::BTreeMap;
use tracing::debug;

/// Open an authenticated connection to every host in `accesses`.
///
/// Hosts are attempted concurrently and independently: a missing credential
/// or a failed connection is recorded against its host while the remaining
/// attempts proceed. The partial connection map is returned even when the
/// error set is non-empty; callers decide whether partial success is usable.
pub async fn connect_to_hosts<C: Connector>(
    connector: &C,
    accesses: &HostAccess,
    credentials: &BTreeMap<String, Credentials>,
) -> (BTreeMap<String, C::Connection>, ErrorSet) {
    let attempts = accesses.iter().map(|(host, access)| async move {
        // the zero index is safe: grouped maps hold at least one access per host
        let database = &access[0].database.name;
        let result = match credentials.get(host) {
            None => Err(GrantError::MissingCredentials(host.clone())),
            Some(creds) => {
                let target = ConnectionString {
                    host: host.clone(),
                    database: database.clone(),
                    user: creds.name.clone(),
                    password: creds.password.clone(),
                };
                debug!(target = %target, "connecting to host");
                connector
                    .connect(&target)
                    .await
                    .map_err(|source| GrantError::Connect {
                        target: target.to_string(),
                        source: Box::new(source),
                    })
            }
        };
        (host.clone(), result)
    });

    let mut connections = BTreeMap::new();
    let mut errs = ErrorSet::new();
    for (host, result) in join_all(attempts).await {
        match result {
            Ok(connection) => {
                connections.insert(host, connection);
            }
            Err(error) => errs.push(host, error),
        }
    }
    (connections, errs)
}

/// Close every connection in the map, aggregating close failures per host.
///
/// Must run exactly once per connection set, on every exit path of the
/// caller, so no connection outlives its run.
pub async fn close_connections<C: Connector>(
    connector: &C,
    connections: BTreeMap<String, C::Connection>,
) -> ErrorSet {
    let closures = connections
        .into_iter()
        .map(|(host, connection)| async move { (host, connector.close(connection).await) });

    let mut errs = ErrorSet::new();
    for (host, result) in join_all(closures).await {
        if let Err(error) = result {
            errs.push(host, error);
        }
    }
    errs
}
