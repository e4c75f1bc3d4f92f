//! Common error infrastructure for game-core.
//!
//! Every rejected ledger call carries a stable numeric [`ErrorCode`] with a
//! human-readable reason. Codes are grouped by category (access, fees,
//! character, combat, enemy, rewards, codec) so clients can classify a
//! revert without inspecting message text.
//!
//! # Design Principles
//!
//! - **Stable codes**: numeric values never change once published
//! - **Checked before mutation**: validation faults leave state untouched
//! - **Severity Classification**: errors are categorized for recovery strategies

use crate::types::AccountId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: temporary conditions that may succeed on retry
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: unrecoverable errors indicating corrupted ledger state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Can retry with the same call once conditions change.
    ///
    /// Examples: pool temporarily underfunded
    Recoverable,

    /// Invalid input; do not retry without changes.
    ///
    /// Examples: character does not exist, healing on cooldown
    Validation,

    /// Unexpected state inconsistency.
    ///
    /// Examples: a packed field overflowed during commit
    Internal,

    /// Ledger state corrupted, cannot continue.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all game-core errors.
///
/// Provides a uniform interface for classification across error types.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Coarse grouping of error codes, derived from the code's numeric range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    Access,
    Fee,
    Character,
    Combat,
    Enemy,
    Reward,
    Codec,
}

/// Stable catalogue of ledger rejection codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum ErrorCode {
    OnlyOwner = 1001,

    InsufficientFee = 1101,
    AlreadyAtFullHealth = 1102,
    HealingOnCooldown = 1103,
    InsufficientBalance = 1104,

    CharacterDoesNotExist = 1201,
    CharacterNotAlive = 1202,
    InvalidAddress = 1203,
    CharacterInCombat = 1204,
    CharacterNotInCombat = 1205,
    CharacterAlreadyExists = 1206,
    InvalidClass = 1207,
    CharacterAlreadyAlive = 1208,
    NoEndurance = 1209,

    InvalidEnemyLevel = 1301,

    EnemyDoesNotExist = 1601,
    NoActiveCombat = 1602,

    InvalidEpoch = 1701,
    NoFundsProvided = 1702,
    InsufficientPoolBalance = 1704,
    InvalidRoot = 1705,
    EpochAlreadyPublished = 1706,
    UnfundedEpoch = 1707,
    NoRootAvailable = 1708,
    DisputeWindowActive = 1709,
    ClaimWindowExpired = 1710,
    AlreadyClaimed = 1711,
    InsufficientEpochFunds = 1712,
    NotPublished = 1713,
    ClaimWindowActive = 1714,
    NoUnclaimedFunds = 1715,
    InvalidRecipient = 1716,
    EpochClosed = 1717,
    InvalidProof = 1719,

    FieldOverflow = 2001,
    CorruptedRecord = 2002,
}

impl ErrorCode {
    pub const fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|candidate| candidate.code() == code)
    }

    /// Reason string surfaced alongside `(allowed, reason)` checks and reverts.
    pub const fn message(self) -> &'static str {
        match self {
            Self::OnlyOwner => "Only owner",
            Self::InsufficientFee => "Insufficient fee",
            Self::AlreadyAtFullHealth => "Already at full health",
            Self::HealingOnCooldown => "Healing on cooldown",
            Self::InsufficientBalance => "Insufficient balance",
            Self::CharacterDoesNotExist => "Character does not exist",
            Self::CharacterNotAlive => "Character is not alive",
            Self::InvalidAddress => "Invalid address",
            Self::CharacterInCombat => "Character is in combat",
            Self::CharacterNotInCombat => "Character is not in combat",
            Self::CharacterAlreadyExists => "Character already exists",
            Self::InvalidClass => "Invalid class",
            Self::CharacterAlreadyAlive => "Character is already alive",
            Self::NoEndurance => "Character has no endurance",
            Self::InvalidEnemyLevel => "Invalid enemy level",
            Self::EnemyDoesNotExist => "Enemy does not exist",
            Self::NoActiveCombat => "No active combat state",
            Self::InvalidEpoch => "Invalid epoch",
            Self::NoFundsProvided => "No funds provided",
            Self::InsufficientPoolBalance => "Insufficient pool balance",
            Self::InvalidRoot => "Invalid root",
            Self::EpochAlreadyPublished => "Epoch already published",
            Self::UnfundedEpoch => "Unfunded epoch",
            Self::NoRootAvailable => "No root available",
            Self::DisputeWindowActive => "Dispute window not expired",
            Self::ClaimWindowExpired => "Claim window expired",
            Self::AlreadyClaimed => "Already claimed",
            Self::InsufficientEpochFunds => "Insufficient epoch funds",
            Self::NotPublished => "Not published",
            Self::ClaimWindowActive => "Claim window still active",
            Self::NoUnclaimedFunds => "No unclaimed funds",
            Self::InvalidRecipient => "Invalid recipient",
            Self::EpochClosed => "Epoch rewards closed",
            Self::InvalidProof => "Invalid proof",
            Self::FieldOverflow => "Packed field overflow",
            Self::CorruptedRecord => "Corrupted character record",
        }
    }

    pub const fn category(self) -> ErrorCategory {
        match self.code() {
            1000..=1099 => ErrorCategory::Access,
            1100..=1199 => ErrorCategory::Fee,
            1200..=1299 => ErrorCategory::Character,
            1300..=1399 => ErrorCategory::Combat,
            1600..=1699 => ErrorCategory::Enemy,
            1700..=1799 => ErrorCategory::Reward,
            _ => ErrorCategory::Codec,
        }
    }

    /// Rejections that may clear without the caller changing anything.
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::InsufficientPoolBalance | Self::DisputeWindowActive)
    }
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

/// A rejected ledger call.
///
/// Carries the stable code and, when known, the account the call acted on.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("{code}")]
pub struct LedgerError {
    pub code: ErrorCode,
    pub account: Option<AccountId>,
}

impl LedgerError {
    pub const fn new(code: ErrorCode) -> Self {
        Self {
            code,
            account: None,
        }
    }

    #[must_use]
    pub const fn for_account(mut self, account: AccountId) -> Self {
        self.account = Some(account);
        self
    }

    pub const fn reason(&self) -> &'static str {
        self.code.message()
    }
}

impl From<ErrorCode> for LedgerError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code)
    }
}

impl GameError for LedgerError {
    fn severity(&self) -> ErrorSeverity {
        match self.code.category() {
            ErrorCategory::Codec => ErrorSeverity::Internal,
            _ if self.code.is_retryable() => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        self.code.into()
    }
}
