pub mod builders;
pub mod mocks;

pub use builders::{accesses_for, principal, read_access, sync_config};
pub use mocks::{MockConnector, MockResolver, MockSynchronizer};
