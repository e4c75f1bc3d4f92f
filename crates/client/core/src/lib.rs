//! Client-side session orchestration for the brawler ledger.
//!
//! Turns asynchronous, fallible ledger submissions into one coherent status
//! stream per action, and republishes what the ledger emitted in a form a UI
//! can show directly.
//!
//! # Architecture
//!
//! ```text
//! ClientContext ── ledger: Arc<dyn GameBlockchain>
//!               ── wallet: Arc<dyn Wallet>
//!               ── config: OrchestratorConfig
//!        │
//!        ▼
//! SessionOrchestrator::submit(call) ──► ActionHandle (Pending, Confirming, Completed | Failed)
//!                                   ──► RefreshSignal broadcast after Completed
//! SessionOrchestrator::subscribe_events(filter) ──► EventSubscription
//! ```
//!
//! Reward roots are computed off-ledger with [`RewardTree`].
pub mod action;
pub mod config;
pub mod context;
pub mod decode;
pub mod error;
pub mod orchestrator;
pub mod refresh;
pub mod rewards;
pub mod subscription;

pub use action::{ActionHandle, ActionId, ActionOutcome, ActionPhase, ActionRecord, ActionStatus};
pub use config::OrchestratorConfig;
pub use context::ClientContext;
pub use decode::{DecodedEvent, decode_chain_event, decode_event, decode_events};
pub use error::{ActionFailure, FailureCategory, OrchestratorError};
pub use orchestrator::SessionOrchestrator;
pub use refresh::{RefreshScope, RefreshSignal};
pub use rewards::{RewardEntry, RewardTree, RewardTreeError, collect_scores};
pub use subscription::{EventFilter, EventSubscription, ObservedEvent};
