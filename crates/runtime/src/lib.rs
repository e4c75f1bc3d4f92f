//! In-process ledger runtime for the brawler game.
//!
//! This crate wires the deterministic [`game_core::Ledger`] into a tokio
//! worker that sequences transactions into blocks, keeps receipts, and
//! publishes emitted events. Consumers embed [`Runtime`] and interact with
//! the chain through [`RuntimeHandle`], which also implements the
//! [`client_blockchain_core::LedgerTransport`] trait.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`workers`] keeps background tasks internal to the crate
//! - [`repository`] persists chain snapshots across restarts
pub mod api;
pub mod events;
pub mod repository;
pub mod runtime;

mod utils;
mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{BlockEvent, Event, EventBus, Topic};
pub use repository::{
    ChainSnapshot, FileSnapshotRepository, InMemorySnapshotRepository, RepositoryError,
    SnapshotRepository,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use workers::{ChainClock, ClockMode};
