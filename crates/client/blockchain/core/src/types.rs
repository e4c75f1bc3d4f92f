//! Common types for ledger interactions.

use std::fmt;

use game_core::{AccountId, Amount, LedgerCall, LedgerError, LedgerEvent, Timestamp};
use serde::{Deserialize, Serialize};

/// Transaction identifier assigned by the ledger backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub Vec<u8>);

impl TransactionId {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// First four bytes in hex, for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..self.0.len().min(4)])
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// A call as submitted by a wallet: who sends it, what value is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    pub sender: AccountId,
    pub value: Amount,
    pub call: LedgerCall,
}

impl TransactionData {
    pub fn new(sender: AccountId, call: LedgerCall) -> Self {
        Self {
            sender,
            value: 0,
            call,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: Amount) -> Self {
        self.value = value;
        self
    }
}

/// Block metadata attached to inclusion and receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub height: u64,
    pub timestamp: Timestamp,
}

/// What executing a transaction did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptOutcome {
    Success { events: Vec<LedgerEvent> },
    Reverted { error: LedgerError },
}

/// Final record of an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_id: TransactionId,
    pub block: BlockInfo,
    pub outcome: ReceiptOutcome,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, ReceiptOutcome::Success { .. })
    }

    pub fn events(&self) -> &[LedgerEvent] {
        match &self.outcome {
            ReceiptOutcome::Success { events } => events,
            ReceiptOutcome::Reverted { .. } => &[],
        }
    }
}

/// Transaction status on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Waiting in the mempool.
    Pending,

    /// Included in a block that has not reached the required depth yet.
    Confirming { block: BlockInfo, confirmations: u64 },

    /// Included and final.
    Finalized(Receipt),
}

impl TransactionStatus {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Finalized(_))
    }
}

/// A ledger event as observed by subscribers, tagged with where it landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEvent {
    pub block: BlockInfo,
    pub transaction_id: TransactionId,
    pub event: LedgerEvent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::ErrorCode;

    #[test]
    fn transaction_id_displays_as_hex() {
        let id = TransactionId::from_bytes(vec![0xde, 0xad, 0xbe, 0xef, 0x01]);
        assert_eq!(id.to_string(), "0xdeadbeef01");
        assert_eq!(id.short(), "deadbeef");
        assert_eq!(TransactionId::from_bytes(vec![0xab]).short(), "ab");
    }

    #[test]
    fn reverted_receipt_has_no_events() {
        let receipt = Receipt {
            transaction_id: TransactionId::from_bytes(vec![1]),
            block: BlockInfo {
                height: 3,
                timestamp: 100,
            },
            outcome: ReceiptOutcome::Reverted {
                error: ErrorCode::HealingOnCooldown.into(),
            },
        };
        assert!(!receipt.succeeded());
        assert!(receipt.events().is_empty());
    }
}
