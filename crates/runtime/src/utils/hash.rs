//! Hashing utilities for transaction ids.

use sha2::{Digest, Sha256};

use client_blockchain_core::{TransactionData, TransactionId};

/// Transaction id: `sha256(bincode(tx) || sequence)`.
///
/// The sequence number keeps identical resubmissions distinct.
pub fn transaction_id(tx: &TransactionData, sequence: u64) -> Result<TransactionId, bincode::Error> {
    let bytes = bincode::serialize(tx)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hasher.update(sequence.to_be_bytes());
    Ok(TransactionId::from_bytes(hasher.finalize().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{AccountId, LedgerCall};

    #[test]
    fn ids_are_deterministic_and_sequence_bound() {
        let tx = TransactionData::new(AccountId::from_index(1), LedgerCall::ContinueFight);
        let first = transaction_id(&tx, 1).unwrap();
        assert_eq!(first, transaction_id(&tx, 1).unwrap());
        assert_ne!(first, transaction_id(&tx, 2).unwrap());
        assert_eq!(first.as_bytes().len(), 32);
    }
}
