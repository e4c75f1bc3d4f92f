//! `(allowed, reason)` eligibility checks.
//!
//! The same functions gate the mutating calls and answer the read-only
//! `can_*` queries, so a client that checks first never sees a different
//! verdict from the call itself (barring state changing in between).
use crate::character::Character;
use crate::error::{ErrorCode, LedgerError};
use crate::progression::healing_cooldown_remaining;
use crate::types::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Eligibility {
    pub allowed: bool,
    pub reason: Option<ErrorCode>,
}

impl Eligibility {
    pub const ALLOWED: Self = Self {
        allowed: true,
        reason: None,
    };

    pub const fn deny(code: ErrorCode) -> Self {
        Self {
            allowed: false,
            reason: Some(code),
        }
    }

    /// Boolean verdict with the reason text (empty when allowed).
    pub fn as_pair(&self) -> (bool, &'static str) {
        (self.allowed, self.reason.map(ErrorCode::message).unwrap_or(""))
    }

    pub fn into_result(self) -> Result<(), LedgerError> {
        match self.reason {
            Some(code) if !self.allowed => Err(LedgerError::new(code)),
            _ => Ok(()),
        }
    }
}

pub fn fight(character: Option<&Character>) -> Eligibility {
    let Some(character) = character else {
        return Eligibility::deny(ErrorCode::CharacterDoesNotExist);
    };
    if !character.is_alive() {
        return Eligibility::deny(ErrorCode::CharacterNotAlive);
    }
    if character.in_combat() {
        return Eligibility::deny(ErrorCode::CharacterInCombat);
    }
    if character.current_endurance == 0 {
        return Eligibility::deny(ErrorCode::NoEndurance);
    }
    Eligibility::ALLOWED
}

pub fn heal(character: Option<&Character>, now: Timestamp, cooldown: Timestamp) -> Eligibility {
    let Some(character) = character else {
        return Eligibility::deny(ErrorCode::CharacterDoesNotExist);
    };
    if !character.is_alive() {
        return Eligibility::deny(ErrorCode::CharacterNotAlive);
    }
    if character.in_combat() {
        return Eligibility::deny(ErrorCode::CharacterInCombat);
    }
    if character.is_full_health() {
        return Eligibility::deny(ErrorCode::AlreadyAtFullHealth);
    }
    if healing_cooldown_remaining(character, now, cooldown) > 0 {
        return Eligibility::deny(ErrorCode::HealingOnCooldown);
    }
    Eligibility::ALLOWED
}

pub fn resurrect(character: Option<&Character>) -> Eligibility {
    match character {
        None => Eligibility::deny(ErrorCode::CharacterDoesNotExist),
        Some(character) if character.is_alive() => {
            Eligibility::deny(ErrorCode::CharacterAlreadyAlive)
        }
        Some(_) => Eligibility::ALLOWED,
    }
}

/// `has_session` is whether an unresolved fight is stored for the player.
pub fn continue_fight(character: Option<&Character>, has_session: bool) -> Eligibility {
    match character {
        None => Eligibility::deny(ErrorCode::CharacterDoesNotExist),
        Some(_) if !has_session => Eligibility::deny(ErrorCode::NoActiveCombat),
        Some(_) => Eligibility::ALLOWED,
    }
}
