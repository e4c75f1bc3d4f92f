//! Ledger abstraction layer for the brawler client.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: GameBlockchain (composite trait)
//!          └── GameReader
//!
//! Layer 1: Domain Traits (GameReader, Wallet)
//!
//! Layer 0: LedgerTransport (pure infrastructure)
//! ```
//!
//! - **Layer 0 (Transport)**: submit, poll, query, subscribe; no game knowledge
//! - **Layer 1 (Domain)**: typed reads and the signing identity
//! - **Layer 2 (Composite)**: what a client context holds on to
//!
//! # Usage
//!
//! ```ignore
//! use client_blockchain_core::{GameReader, LedgerTransport, TransactionData};
//!
//! async fn heal(ledger: &dyn GameBlockchain, me: AccountId) -> Result<(), TransportError> {
//!     if ledger.can_heal(me).await?.allowed {
//!         let id = ledger.submit_transaction(TransactionData::new(me, LedgerCall::HealCharacter)).await?;
//!         ledger.wait_for_receipt(&id, Duration::from_millis(250)).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod traits;
pub mod types;
pub mod wallet;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use traits::{
    GameBlockchain, GameReader, LedgerTransport, SubmissionError, TransportError, Wallet,
    WalletError,
};

pub use types::{
    BlockInfo, ChainEvent, Receipt, ReceiptOutcome, TransactionData, TransactionId,
    TransactionStatus,
};
pub use wallet::{ApprovalPolicy, LocalWallet};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockStep, MockTransport};
