//! Calls accepted by the ledger.
use crate::combat::EnemyId;
use crate::treasury::Hash32;
use crate::types::{AccountId, Amount, Epoch};

/// A state-changing ledger call.
///
/// Player calls act on the caller's own character. Treasury administration
/// calls are restricted to the ledger admin.
#[derive(Clone, Debug, PartialEq, Eq, strum::EnumDiscriminants)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum_discriminants(name(CallKind))]
#[strum_discriminants(derive(Hash, strum::Display, strum::EnumString, strum::EnumIter))]
#[strum_discriminants(strum(serialize_all = "snake_case", ascii_case_insensitive))]
pub enum LedgerCall {
    /// Raw class index; unknown values are rejected with `InvalidClass`.
    CreateCharacter {
        class: u8,
    },
    FightEnemy {
        enemy_id: EnemyId,
        enemy_level: u32,
    },
    ContinueFight,
    FleeRound,
    HealCharacter,
    ResurrectCharacter,
    ClaimReward {
        epoch: Epoch,
        index: u64,
        account: AccountId,
        amount: Amount,
        proof: Vec<Hash32>,
    },
    FundEpoch {
        epoch: Epoch,
        amount: Amount,
    },
    PublishEpochRoot {
        epoch: Epoch,
        root: Hash32,
        total_allocated: Amount,
    },
    RollUnclaimedFunds {
        epoch: Epoch,
    },
    ConsumeEpochReserve {
        epoch: Epoch,
        amount: Amount,
    },
    ConsumeEmergencyReserve {
        epoch: Epoch,
        amount: Amount,
    },
}

impl LedgerCall {
    pub fn kind(&self) -> CallKind {
        self.into()
    }
}

impl CallKind {
    pub const fn is_admin(self) -> bool {
        matches!(
            self,
            Self::FundEpoch
                | Self::PublishEpochRoot
                | Self::RollUnclaimedFunds
                | Self::ConsumeEpochReserve
                | Self::ConsumeEmergencyReserve
        )
    }

    /// Calls that change the caller's character record.
    pub const fn mutates_character(self) -> bool {
        matches!(
            self,
            Self::CreateCharacter
                | Self::FightEnemy
                | Self::ContinueFight
                | Self::FleeRound
                | Self::HealCharacter
                | Self::ResurrectCharacter
        )
    }

    pub const fn is_fight(self) -> bool {
        matches!(self, Self::FightEnemy | Self::ContinueFight | Self::FleeRound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn kinds_classify_calls() {
        let call = LedgerCall::FightEnemy {
            enemy_id: 1,
            enemy_level: 1,
        };
        assert_eq!(call.kind(), CallKind::FightEnemy);
        assert!(call.kind().is_fight());
        assert!(call.kind().mutates_character());
        assert!(!call.kind().is_admin());

        let admin = LedgerCall::RollUnclaimedFunds { epoch: 0 };
        assert!(admin.kind().is_admin());
        assert!(!admin.kind().mutates_character());
    }

    #[test]
    fn kind_names_round_trip() {
        assert_eq!(CallKind::ContinueFight.to_string(), "continue_fight");
        assert_eq!(
            CallKind::from_str("heal_character").unwrap(),
            CallKind::HealCharacter
        );
    }
}
