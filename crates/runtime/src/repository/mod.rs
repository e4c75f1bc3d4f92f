//! Repository layer for chain persistence.
//!
//! The ledger worker hands a [`ChainSnapshot`] to the configured repository
//! after every block that carried transactions, and the runtime builder
//! restores from it on start.

mod error;
mod snapshot;

pub use error::RepositoryError;
pub use snapshot::{ChainSnapshot, FileSnapshotRepository, InMemorySnapshotRepository, SnapshotRepository};
