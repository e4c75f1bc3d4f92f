//! Reward-claim leaf hashing and Merkle proof verification.
//!
//! Leaves commit to `(epoch, index, account, amount)` as
//!
//! ```text
//! sha256( epoch:u256be || index:u256be || account:20 bytes || amount:u256be )
//! ```
//!
//! Interior nodes hash the sorted pair `sha256(min(a, b) || max(a, b))`, so a
//! proof is just the list of siblings with no left/right markers.
use sha2::{Digest, Sha256};

use crate::types::{AccountId, Amount, Epoch};

pub type Hash32 = [u8; 32];

fn word(value: u128) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[16..].copy_from_slice(&value.to_be_bytes());
    out
}

pub fn leaf_hash(epoch: Epoch, index: u64, account: &AccountId, amount: Amount) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(word(epoch as u128));
    hasher.update(word(index as u128));
    hasher.update(account.as_bytes());
    hasher.update(word(amount));
    hasher.finalize().into()
}

pub fn hash_pair(a: &Hash32, b: &Hash32) -> Hash32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update(lo);
    hasher.update(hi);
    hasher.finalize().into()
}

/// Folds `proof` over `leaf` and compares with `root`.
pub fn verify_proof(proof: &[Hash32], root: &Hash32, leaf: Hash32) -> bool {
    let computed = proof
        .iter()
        .fold(leaf, |node, sibling| hash_pair(&node, sibling));
    &computed == root
}
