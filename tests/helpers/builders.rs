use perigee::access::{DatabaseSchema, HostAccess, PrincipalSpec, Privilege, ReadWriteAccess};
use perigee::grants::SyncConfig;
use perigee::postgres::Credentials;

/// A principal spec with empty read/write lists; the mock resolver supplies
/// the resolved accesses directly.
pub fn principal(name: &str) -> PrincipalSpec {
    PrincipalSpec {
        name: name.to_string(),
        read: Vec::new(),
        write: Vec::new(),
    }
}

/// Single read access entry for `host` on `database`.
pub fn read_access(host: &str, database: &str) -> ReadWriteAccess {
    ReadWriteAccess {
        host: host.to_string(),
        database: DatabaseSchema {
            name: database.to_string(),
            schema: database.to_string(),
            privileges: Privilege::Read,
        },
    }
}

/// Host-access map with one read entry per (host, database) pair.
pub fn accesses_for(entries: &[(&str, &str)]) -> HostAccess {
    let mut accesses = HostAccess::new();
    for (host, database) in entries {
        accesses
            .entry(host.to_string())
            .or_default()
            .push(read_access(host, database));
    }
    accesses
}

/// Sync configuration with admin credentials for the given hosts and a
/// single static role.
pub fn sync_config(hosts: &[&str]) -> SyncConfig {
    SyncConfig {
        host_credentials: hosts
            .iter()
            .map(|host| {
                (
                    host.to_string(),
                    Credentials {
                        name: "admin".to_string(),
                        password: "secret".to_string(),
                    },
                )
            })
            .collect(),
        static_roles: vec!["rds_iam".to_string()],
    }
}
