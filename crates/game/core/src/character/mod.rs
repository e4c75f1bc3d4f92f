//! Player character model.
//!
//! [`Character`] is the decoded, strongly-typed view of a ledger record. The
//! ledger persists it as a [`PackedCharacter`] (two fixed-width words); see
//! [`codec`] for the bit layout and overflow rules.
pub mod codec;

use bitflags::bitflags;

use crate::config::GameConfig;
use crate::types::Timestamp;

pub use codec::{PackError, PackedCharacter, PackedField};

/// Playable classes. The discriminant is the value stored on the ledger.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[repr(u8)]
pub enum CharacterClass {
    Warrior = 0,
    Guardian = 1,
    Rogue = 2,
    Mage = 3,
}

impl CharacterClass {
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Warrior),
            1 => Some(Self::Guardian),
            2 => Some(Self::Rogue),
            3 => Some(Self::Mage),
            _ => None,
        }
    }

    /// Level-1 stats for a freshly created character of this class.
    pub const fn base_stats(self) -> BaseStats {
        match self {
            Self::Warrior => BaseStats::new(8, 20, 4, 1),
            Self::Guardian => BaseStats::new(5, 26, 7, 1),
            Self::Rogue => BaseStats::new(7, 18, 3, 4),
            Self::Mage => BaseStats::new(9, 16, 2, 3),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseStats {
    pub combat: u32,
    pub endurance: u32,
    pub defense: u32,
    pub luck: u32,
}

impl BaseStats {
    pub const fn new(combat: u32, endurance: u32, defense: u32, luck: u32) -> Self {
        Self {
            combat,
            endurance,
            defense,
            luck,
        }
    }
}

/// Additive modifiers from the most recent equipment drop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquipmentBonuses {
    pub combat: u32,
    pub endurance: u32,
    pub defense: u32,
    pub luck: u32,
}

bitflags! {
    /// Status bits stored next to the level in the core word.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CharacterFlags: u8 {
        const ALIVE     = 0b01;
        const IN_COMBAT = 0b10;
    }
}

/// Decoded character record.
///
/// `base_*` fields exclude equipment; the `total_*` accessors add the
/// equipped bonuses. `current_endurance` never exceeds [`Self::max_endurance`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Character {
    pub class: CharacterClass,
    pub level: u32,
    pub experience: u64,
    pub flags: CharacterFlags,
    pub current_endurance: u32,
    pub base_endurance: u32,
    pub base_combat: u32,
    pub base_defense: u32,
    pub base_luck: u32,
    pub equipment: EquipmentBonuses,
    pub total_kills: u64,
    /// Anchor for lazy passive regeneration.
    pub last_update_at: Timestamp,
    /// Zero until the first paid heal.
    pub last_heal_at: Timestamp,
}

impl Character {
    pub fn new(class: CharacterClass, now: Timestamp) -> Self {
        let base = class.base_stats();
        Self {
            class,
            level: 1,
            experience: 0,
            flags: CharacterFlags::ALIVE,
            current_endurance: base.endurance,
            base_endurance: base.endurance,
            base_combat: base.combat,
            base_defense: base.defense,
            base_luck: base.luck,
            equipment: EquipmentBonuses::default(),
            total_kills: 0,
            last_update_at: now,
            last_heal_at: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.flags.contains(CharacterFlags::ALIVE)
    }

    pub fn in_combat(&self) -> bool {
        self.flags.contains(CharacterFlags::IN_COMBAT)
    }

    pub fn set_alive(&mut self, alive: bool) {
        self.flags.set(CharacterFlags::ALIVE, alive);
    }

    pub fn set_in_combat(&mut self, in_combat: bool) {
        self.flags.set(CharacterFlags::IN_COMBAT, in_combat);
    }

    pub fn max_endurance(&self) -> u32 {
        self.base_endurance.saturating_add(self.equipment.endurance)
    }

    pub fn total_combat(&self) -> u32 {
        self.base_combat.saturating_add(self.equipment.combat)
    }

    pub fn total_defense(&self) -> u32 {
        self.base_defense.saturating_add(self.equipment.defense)
    }

    pub fn total_luck(&self) -> u32 {
        self.base_luck.saturating_add(self.equipment.luck)
    }

    pub fn is_full_health(&self) -> bool {
        self.current_endurance >= self.max_endurance()
    }

    /// Pulls `current_endurance` back under the maximum.
    ///
    /// Returns `true` if the record violated the invariant.
    pub fn clamp_endurance(&mut self) -> bool {
        let max = self.max_endurance();
        if self.current_endurance > max {
            self.current_endurance = max;
            true
        } else {
            false
        }
    }

    /// Sets endurance, clamped to the maximum.
    pub fn set_endurance(&mut self, endurance: u32) {
        self.current_endurance = endurance.min(self.max_endurance());
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= GameConfig::MAX_LEVEL
    }
}
