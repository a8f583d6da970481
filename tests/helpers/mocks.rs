use async_trait::async_trait;
use perigee::access::{AccessSpec, DatabaseSchema, HostAccess};
use perigee::errors::{ErrorSet, GrantError};
use perigee::grants::resolve::AccessResolver;
use perigee::postgres::{ConnectionString, Connector, RoleSynchronizer};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// Resolver returning a canned host-access map plus scripted failures.
#[derive(Debug, Clone, Default)]
pub struct MockResolver {
    pub accesses: HostAccess,
    /// (scope, message) pairs reported as resolution failures.
    pub failures: Vec<(String, String)>,
}

#[async_trait]
impl AccessResolver for MockResolver {
    async fn resolve(
        &self,
        _namespace: &str,
        _read: &[AccessSpec],
        _write: &[AccessSpec],
    ) -> (HostAccess, ErrorSet) {
        let mut errs = ErrorSet::new();
        for (scope, message) in &self.failures {
            errs.push(scope.clone(), GrantError::Other(message.clone()));
        }
        (self.accesses.clone(), errs)
    }
}

/// Connection handle recording which host it belongs to.
#[derive(Debug, Clone)]
pub struct MockConnection {
    pub host: String,
}

/// Connector that records every connect and close call and fails on demand.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    pub fail_hosts: BTreeSet<String>,
    pub opened: Arc<Mutex<Vec<String>>>,
    pub closed: Arc<Mutex<Vec<String>>>,
}

impl MockConnector {
    pub fn failing_on(hosts: &[&str]) -> Self {
        Self {
            fail_hosts: hosts.iter().map(|h| h.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn opened_hosts(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn closed_hosts(&self) -> Vec<String> {
        self.closed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Connection = MockConnection;

    async fn connect(&self, target: &ConnectionString) -> Result<MockConnection, GrantError> {
        if self.fail_hosts.contains(&target.host) {
            return Err(GrantError::Other("connection refused".to_string()));
        }
        self.opened.lock().unwrap().push(target.host.clone());
        Ok(MockConnection {
            host: target.host.clone(),
        })
    }

    async fn close(&self, connection: MockConnection) -> Result<(), GrantError> {
        self.closed.lock().unwrap().push(connection.host);
        Ok(())
    }
}

/// One recorded `synchronize_role` invocation.
#[derive(Debug, Clone)]
pub struct SynchronizeCall {
    pub host: String,
    pub role: String,
    pub static_roles: Vec<String>,
    pub schemas: Vec<DatabaseSchema>,
}

/// Role synchronizer recording calls and failing on demand per host.
#[derive(Debug, Clone, Default)]
pub struct MockSynchronizer {
    pub fail_hosts: BTreeSet<String>,
    pub calls: Arc<Mutex<Vec<SynchronizeCall>>>,
}

impl MockSynchronizer {
    pub fn failing_on(hosts: &[&str]) -> Self {
        Self {
            fail_hosts: hosts.iter().map(|h| h.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn recorded_calls(&self) -> Vec<SynchronizeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn synchronized_hosts(&self) -> Vec<String> {
        self.recorded_calls().into_iter().map(|c| c.host).collect()
    }
}

#[async_trait]
impl RoleSynchronizer<MockConnection> for MockSynchronizer {
    async fn synchronize_role(
        &self,
        connection: &MockConnection,
        role: &str,
        static_roles: &[String],
        schemas: &[DatabaseSchema],
    ) -> Result<(), GrantError> {
        self.calls.lock().unwrap().push(SynchronizeCall {
            host: connection.host.clone(),
            role: role.to_string(),
            static_roles: static_roles.to_vec(),
            schemas: schemas.to_vec(),
        });
        if self.fail_hosts.contains(&connection.host) {
            return Err(GrantError::Other("grant roles failed".to_string()));
        }
        Ok(())
    }
}
