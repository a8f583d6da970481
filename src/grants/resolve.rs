//! Resolution seam: declarative read/write specs to host-grouped accesses.

use crate::access::{AccessSpec, DatabaseSchema, HostAccess, Privilege, ReadWriteAccess};
use crate::errors::{ErrorSet, GrantError};
use async_trait::async_trait;

/// Resolves declarative read/write specifications into concrete host-grouped
/// accesses.
///
/// Resolution is partial-tolerant: the returned map holds every group that
/// could be resolved and the error set names every spec that could not. An
/// empty map together with a non-empty error set means resolution failed
/// completely.
#[async_trait]
pub trait AccessResolver: Send + Sync {
    async fn resolve(
        &self,
        namespace: &str,
        read: &[AccessSpec],
        write: &[AccessSpec],
    ) -> (HostAccess, ErrorSet);
}

/// Resolver for specs that name their host and database directly.
///
/// Upstream deployments resolve hosts through namespace-scoped request
/// objects; this resolver covers the directly-specified form with the same
/// partial-tolerant contract. The namespace labels error scopes.
#[derive(Debug, Clone, Default)]
pub struct SpecResolver;

#[async_trait]
impl AccessResolver for SpecResolver {
    async fn resolve(
        &self,
        namespace: &str,
        read: &[AccessSpec],
        write: &[AccessSpec],
    ) -> (HostAccess, ErrorSet) {
        let mut accesses = HostAccess::new();
        let mut errs = ErrorSet::new();
        group(namespace, read, Privilege::Read, &mut accesses, &mut errs);
        group(namespace, write, Privilege::Write, &mut accesses, &mut errs);
        (accesses, errs)
    }
}

fn group(
    namespace: &str,
    specs: &[AccessSpec],
    privileges: Privilege,
    accesses: &mut HostAccess,
    errs: &mut ErrorSet,
) {
    for spec in specs {
        if spec.host.is_empty() || spec.database.is_empty() {
            errs.push(
                format!("{}/{}", namespace, spec.database),
                GrantError::Other(format!(
                    "{} access spec is missing a host or database",
                    privileges
                )),
            );
            continue;
        }
        accesses
            .entry(spec.host.clone())
            .or_default()
            .push(ReadWriteAccess {
                host: spec.host.clone(),
                database: DatabaseSchema {
                    name: spec.database.clone(),
                    schema: spec.schema_name().to_string(),
                    privileges,
                },
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(host: &str, database: &str) -> AccessSpec {
        AccessSpec {
            host: host.to_string(),
            database: database.to_string(),
            schema: None,
            reason: None,
        }
    }

    #[tokio::test]
    async fn test_read_and_write_specs_group_by_host() {
        let read = vec![spec("db1.example.com", "orders")];
        let write = vec![spec("db1.example.com", "orders"), spec("db2.example.com", "billing")];

        let (accesses, errs) = SpecResolver.resolve("dev", &read, &write).await;
        assert!(errs.is_empty());
        assert_eq!(accesses.len(), 2);

        let db1 = &accesses["db1.example.com"];
        assert_eq!(db1.len(), 2);
        assert_eq!(db1[0].database.privileges, Privilege::Read);
        assert_eq!(db1[1].database.privileges, Privilege::Write);

        let db2 = &accesses["db2.example.com"];
        assert_eq!(db2.len(), 1);
        assert_eq!(db2[0].database.name, "billing");
        assert_eq!(db2[0].database.schema, "billing");
    }

    #[tokio::test]
    async fn test_spec_without_host_is_a_scoped_failure() {
        let read = vec![spec("", "orders"), spec("db1.example.com", "billing")];

        let (accesses, errs) = SpecResolver.resolve("dev", &read, &[]).await;

        // the resolvable spec still resolves
        assert_eq!(accesses.len(), 1);
        assert!(accesses.contains_key("db1.example.com"));

        assert_eq!(errs.len(), 1);
        assert_eq!(errs.entries()[0].scope, "dev/orders");
    }

    #[tokio::test]
    async fn test_all_specs_unresolvable_yields_empty_map_and_errors() {
        let read = vec![spec("", "orders")];
        let write = vec![spec("", "billing")];

        let (accesses, errs) = SpecResolver.resolve("dev", &read, &write).await;
        assert!(accesses.is_empty());
        assert_eq!(errs.len(), 2);
    }

    #[tokio::test]
    async fn test_no_specs_is_empty_and_clean() {
        let (accesses, errs) = SpecResolver.resolve("dev", &[], &[]).await;
        assert!(accesses.is_empty());
        assert!(errs.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_schema_is_kept() {
        let read = vec![AccessSpec {
            host: "db1.example.com".to_string(),
            database: "orders".to_string(),
            schema: Some("public".to_string()),
            reason: Some("support rotation".to_string()),
        }];

        let (accesses, _) = SpecResolver.resolve("dev", &read, &[]).await;
        assert_eq!(accesses["db1.example.com"][0].database.schema, "public");
    }
}
