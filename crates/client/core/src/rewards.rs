//! Off-ledger reward tree construction.
//!
//! The ledger only stores an epoch's Merkle root and verifies proofs. This
//! module reads the epoch's scores, splits a reward budget proportionally,
//! and builds the tree and proofs with the same leaf and sorted-pair hashing
//! the ledger checks against.
use client_blockchain_core::{GameReader, TransportError};
use game_core::treasury::{hash_pair, leaf_hash, verify_proof};
use game_core::{AccountId, Amount, Epoch, Hash32, LedgerCall};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewardTreeError {
    #[error("epoch {0} has no positive scores")]
    NoScores(Epoch),

    #[error("epoch {0} allocates nothing")]
    NothingAllocated(Epoch),
}

/// One claimable leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardEntry {
    pub index: u64,
    pub account: AccountId,
    pub amount: Amount,
}

#[derive(Debug, Clone)]
pub struct RewardTree {
    epoch: Epoch,
    entries: Vec<RewardEntry>,
    /// `layers[0]` are the leaves, the last layer holds only the root.
    layers: Vec<Vec<Hash32>>,
}

impl RewardTree {
    /// Splits `budget` across `scores` pro rata, rounding each share down.
    ///
    /// Zero scores get no leaf; indices follow the order of `scores`.
    pub fn from_scores(
        epoch: Epoch,
        scores: &[(AccountId, u64)],
        budget: Amount,
    ) -> Result<Self, RewardTreeError> {
        let total: u128 = scores.iter().map(|(_, score)| *score as u128).sum();
        if total == 0 {
            return Err(RewardTreeError::NoScores(epoch));
        }

        let allocations = scores
            .iter()
            .filter(|(_, score)| *score > 0)
            .map(|(account, score)| (*account, share(budget, *score, total)))
            .filter(|(_, amount)| *amount > 0);
        Self::from_allocations(epoch, allocations)
    }

    /// Builds the tree from explicit amounts.
    pub fn from_allocations(
        epoch: Epoch,
        allocations: impl IntoIterator<Item = (AccountId, Amount)>,
    ) -> Result<Self, RewardTreeError> {
        let entries: Vec<RewardEntry> = allocations
            .into_iter()
            .enumerate()
            .map(|(index, (account, amount))| RewardEntry {
                index: index as u64,
                account,
                amount,
            })
            .collect();
        if entries.is_empty() {
            return Err(RewardTreeError::NothingAllocated(epoch));
        }

        let leaves: Vec<Hash32> = entries
            .iter()
            .map(|entry| leaf_hash(epoch, entry.index, &entry.account, entry.amount))
            .collect();
        let mut layers = vec![leaves];
        while let Some(layer) = layers.last().filter(|layer| layer.len() > 1) {
            let next = layer
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    // odd node is promoted unchanged
                    [single] => *single,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            layers.push(next);
        }

        Ok(Self {
            epoch,
            entries,
            layers,
        })
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn root(&self) -> Hash32 {
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .copied()
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[RewardEntry] {
        &self.entries
    }

    pub fn total_allocated(&self) -> Amount {
        self.entries.iter().map(|entry| entry.amount).sum()
    }

    pub fn entry_for(&self, account: AccountId) -> Option<&RewardEntry> {
        self.entries.iter().find(|entry| entry.account == account)
    }

    /// Sibling hashes from the leaf up; empty for a single-leaf tree.
    pub fn proof(&self, index: u64) -> Option<Vec<Hash32>> {
        let mut position = usize::try_from(index).ok()?;
        if position >= self.entries.len() {
            return None;
        }

        let mut proof = Vec::new();
        for layer in &self.layers[..self.layers.len() - 1] {
            if let Some(sibling) = layer.get(position ^ 1) {
                proof.push(*sibling);
            }
            position /= 2;
        }
        Some(proof)
    }

    pub fn verify(&self, entry: &RewardEntry, proof: &[Hash32]) -> bool {
        let leaf = leaf_hash(self.epoch, entry.index, &entry.account, entry.amount);
        verify_proof(proof, &self.root(), leaf)
    }

    /// Ledger call that publishes this tree's root.
    pub fn publish_call(&self) -> LedgerCall {
        LedgerCall::PublishEpochRoot {
            epoch: self.epoch,
            root: self.root(),
            total_allocated: self.total_allocated(),
        }
    }

    /// Ledger call that claims the leaf at `index`.
    pub fn claim_call(&self, index: u64) -> Option<LedgerCall> {
        let entry = self.entries.get(usize::try_from(index).ok()?)?;
        Some(LedgerCall::ClaimReward {
            epoch: self.epoch,
            index: entry.index,
            account: entry.account,
            amount: entry.amount,
            proof: self.proof(index)?,
        })
    }
}

fn share(budget: Amount, score: u64, total: u128) -> Amount {
    match budget.checked_mul(score as u128) {
        Some(product) => product / total,
        // split the budget first when the product would overflow
        None => budget / total * score as u128,
    }
}

/// Reads every registered player's score for `epoch`, in registry order.
pub async fn collect_scores<R>(reader: &R, epoch: Epoch) -> Result<Vec<(AccountId, u64)>, TransportError>
where
    R: GameReader + ?Sized,
{
    let count = reader.total_player_count().await?;
    let mut scores = Vec::with_capacity(count as usize);
    for index in 0..count {
        let Some(account) = reader.player_by_index(index).await? else {
            continue;
        };
        let score = reader.epoch_score(account, epoch).await?;
        scores.push((account, score));
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use game_core::UNIT;

    use super::*;

    fn scores() -> Vec<(AccountId, u64)> {
        vec![
            (AccountId::from_index(1), 50),
            (AccountId::from_index(2), 0),
            (AccountId::from_index(3), 30),
            (AccountId::from_index(4), 20),
        ]
    }

    #[test]
    fn allocation_is_proportional_and_skips_zero_scores() {
        let tree = RewardTree::from_scores(3, &scores(), 100 * UNIT).unwrap();
        let amounts: Vec<_> = tree.entries().iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![50 * UNIT, 30 * UNIT, 20 * UNIT]);
        assert_eq!(tree.total_allocated(), 100 * UNIT);
        assert!(tree.entry_for(AccountId::from_index(2)).is_none());
        assert_eq!(tree.entry_for(AccountId::from_index(4)).unwrap().index, 2);
    }

    #[test]
    fn rounding_never_exceeds_the_budget() {
        let scores = [(AccountId::from_index(1), 1), (AccountId::from_index(2), 2)];
        let tree = RewardTree::from_scores(1, &scores, 10).unwrap();
        assert_eq!(tree.total_allocated(), 3 + 6);
    }

    #[test]
    fn every_proof_verifies_against_the_root() {
        let allocations = (1..=5).map(|i| (AccountId::from_index(i), i as Amount * UNIT));
        let tree = RewardTree::from_allocations(2, allocations).unwrap();
        for entry in tree.entries() {
            let proof = tree.proof(entry.index).unwrap();
            assert!(tree.verify(entry, &proof), "leaf {} failed", entry.index);
        }

        let mut forged = tree.entries()[0];
        forged.amount += 1;
        assert!(!tree.verify(&forged, &tree.proof(0).unwrap()));
        assert!(tree.proof(5).is_none());
    }

    #[test]
    fn single_leaf_root_is_the_leaf() {
        let account = AccountId::from_index(9);
        let tree = RewardTree::from_allocations(1, [(account, 7)]).unwrap();
        assert_eq!(tree.root(), leaf_hash(1, 0, &account, 7));
        assert_eq!(tree.proof(0), Some(Vec::new()));
    }

    #[test]
    fn empty_epochs_are_rejected() {
        assert_eq!(
            RewardTree::from_scores(4, &[(AccountId::from_index(1), 0)], UNIT).unwrap_err(),
            RewardTreeError::NoScores(4)
        );
        assert_eq!(
            RewardTree::from_allocations(4, Vec::new()).unwrap_err(),
            RewardTreeError::NothingAllocated(4)
        );
    }

    #[test]
    fn calls_carry_root_and_proof() {
        let tree = RewardTree::from_scores(3, &scores(), 100 * UNIT).unwrap();
        match tree.publish_call() {
            LedgerCall::PublishEpochRoot {
                root,
                total_allocated,
                ..
            } => {
                assert_eq!(root, tree.root());
                assert_eq!(total_allocated, 100 * UNIT);
            }
            other => panic!("unexpected call {other:?}"),
        }
        match tree.claim_call(1).unwrap() {
            LedgerCall::ClaimReward { index, proof, .. } => {
                assert_eq!(index, 1);
                assert_eq!(proof, tree.proof(1).unwrap());
            }
            other => panic!("unexpected call {other:?}"),
        }
    }
}
