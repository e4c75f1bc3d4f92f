//! Fee pools, epochs, gas refunds, and Merkle-gated reward claims.
mod epoch;
mod merkle;
mod pools;
mod refund;
mod rewards;

pub use epoch::EpochClock;
pub use merkle::{Hash32, hash_pair, leaf_hash, verify_proof};
pub use pools::{FeeDistribution, Pool, PoolBalances, split_fee};
pub use refund::refund_amount;
pub use rewards::{Claim, ClaimWindows, EpochRewards, RewardBook};
