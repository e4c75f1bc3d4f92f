//! Deterministic randomness for critical hits and equipment drops.
//!
//! Every roll is a pure function of the ledger seed, the call nonce, the
//! acting account, and a [`RollContext`], so replaying the same calls against
//! the same genesis yields the same fights.
use crate::types::{AccountId, BASIS_POINTS};

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform roll in `0..10000`, compared against basis-point chances.
    fn roll_bp(&self, seed: u64) -> u32 {
        self.next_u32(seed) % BASIS_POINTS
    }

    /// Uniform value in `[min, max]` inclusive.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let span = max - min + 1;
        min + (self.next_u32(seed) % span)
    }
}

/// PCG-XSH-RR: 64-bit LCG state, 32-bit permuted output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::step(seed))
    }
}

/// Distinguishes independent rolls made by the same call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollContext {
    PlayerCritical { round: u32 },
    EnemyCritical { round: u32 },
    DropChance,
    DropBonus { slot: u32 },
}

impl RollContext {
    fn word(self) -> u32 {
        match self {
            Self::PlayerCritical { round } => round.wrapping_mul(4),
            Self::EnemyCritical { round } => round.wrapping_mul(4).wrapping_add(1),
            Self::DropChance => 0xd0_0000,
            Self::DropBonus { slot } => 0xd1_0000 + slot,
        }
    }
}

/// Mixes the roll inputs into a single seed.
///
/// Constants are the SplitMix64 / FxHash multipliers followed by the
/// MurmurHash3 finalizer.
pub fn compute_seed(ledger_seed: u64, nonce: u64, account: &AccountId, context: RollContext) -> u64 {
    let mut hash = ledger_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= account.seed_word().wrapping_mul(0x517cc1b727220a95);
    hash ^= (context.word() as u64).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

/// Rolls bound to one call: seed, nonce, and account fixed.
#[derive(Clone, Copy, Debug)]
pub struct CallRng {
    ledger_seed: u64,
    nonce: u64,
    account: AccountId,
}

impl CallRng {
    pub fn new(ledger_seed: u64, nonce: u64, account: AccountId) -> Self {
        Self {
            ledger_seed,
            nonce,
            account,
        }
    }

    fn seed(&self, context: RollContext) -> u64 {
        compute_seed(self.ledger_seed, self.nonce, &self.account, context)
    }

    pub fn roll_bp(&self, context: RollContext) -> u32 {
        PcgRng.roll_bp(self.seed(context))
    }

    pub fn range(&self, context: RollContext, min: u32, max: u32) -> u32 {
        PcgRng.range(self.seed(context), min, max)
    }
}
