//! Perigee - PostgreSQL fleet access-grant controller
//!
//! Grants and revokes fine-grained database access for named principals
//! across a fleet of independently administered PostgreSQL hosts, driven by
//! a declarative access specification per principal. The crate provides the
//! IAM trust-policy document model and the multi-host grant-synchronization
//! engine; resolution of higher-level access requests and the SQL grant
//! execution behind the role-synchronizer seam belong to the embedding
//! controller.

pub mod access;
pub mod errors;
pub mod grants;
pub mod iam;
pub mod postgres;
pub mod settings;
