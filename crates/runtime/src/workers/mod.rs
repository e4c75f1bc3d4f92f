//! Worker tasks that back the runtime orchestration.
//!
//! The ledger worker owns the chain: mempool, block production, receipts.

mod clock;
mod ledger;

pub use clock::{ChainClock, ClockMode};
pub(crate) use clock::system_now;
pub use ledger::{Command, LedgerWorker, WorkerSettings};
