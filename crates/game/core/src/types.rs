//! Primitive ledger types shared by every module.
use core::fmt;
use core::str::FromStr;

/// Native currency amount in base units.
pub type Amount = u128;

/// Ledger time in whole seconds.
pub type Timestamp = u64;

/// Reward epoch number.
pub type Epoch = u64;

/// Denominator for every basis-point quantity (1 bp = 1/10000).
pub const BASIS_POINTS: u32 = 10_000;

/// One whole unit of the native currency.
pub const UNIT: Amount = 1_000_000_000_000_000_000;

/// 20-byte account identity used for players, recipients, and the ledger admin.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    pub const ZERO: Self = Self([0; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Deterministic account derived from a small integer; used for fixtures and demos.
    pub fn from_index(index: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[0] = 0xb0;
        bytes[12..].copy_from_slice(&index.to_be_bytes());
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 20]
    }

    /// Folds the address into a single word for seed mixing.
    pub fn seed_word(&self) -> u64 {
        self.0.chunks(8).fold(0u64, |acc, chunk| {
            let mut word = [0u8; 8];
            word[..chunk.len()].copy_from_slice(chunk);
            acc.rotate_left(17) ^ u64::from_le_bytes(word)
        })
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({self})")
    }
}

/// Failure parsing a `0x`-prefixed 40-digit hex address.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AccountParseError {
    #[error("account must be 40 hex digits, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex digit in account")]
    InvalidDigit,
}

impl FromStr for AccountId {
    type Err = AccountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != 40 {
            return Err(AccountParseError::InvalidLength(digits.len()));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|err| match err {
            hex::FromHexError::InvalidHexCharacter { .. } => AccountParseError::InvalidDigit,
            _ => AccountParseError::InvalidLength(digits.len()),
        })?;
        Ok(Self(bytes))
    }
}

/// Applies a basis-point ratio to an amount, rounding down.
pub fn apply_bp(amount: Amount, bp: u32) -> Amount {
    amount.saturating_mul(bp as Amount) / BASIS_POINTS as Amount
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_display_parses_back() {
        let account = AccountId::from_index(42);
        let text = account.to_string();
        assert_eq!(text, "0xb00000000000000000000000000000000000002a");
        assert_eq!(text.parse::<AccountId>().unwrap(), account);
        assert_eq!(text.to_uppercase()[2..].parse::<AccountId>().unwrap(), account);
    }

    #[test]
    fn account_parse_rejects_short_input() {
        assert_eq!(
            "0x1234".parse::<AccountId>(),
            Err(AccountParseError::InvalidLength(4))
        );
        assert_eq!(
            "zz".repeat(20).parse::<AccountId>(),
            Err(AccountParseError::InvalidDigit)
        );
    }

    #[test]
    fn seed_word_differs_between_accounts() {
        assert_ne!(
            AccountId::from_index(1).seed_word(),
            AccountId::from_index(2).seed_word()
        );
    }

    #[test]
    fn apply_bp_rounds_down() {
        assert_eq!(apply_bp(15, 4_800), 7);
        assert_eq!(apply_bp(10_000, 1), 1);
        assert_eq!(apply_bp(9_999, 1), 0);
    }
}
