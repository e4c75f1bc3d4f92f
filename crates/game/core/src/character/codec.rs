//! Bit-packed ledger representation of a [`Character`].
//!
//! # Layout
//!
//! ```text
//! core word (u128)                     progression word (u128)
//! bits   0..8    level                 bits   0..32   experience
//! bits   8..10   flags (alive, combat) bits  32..64   total kills
//! bits  10..16   class                 bits  64..72   equipped combat bonus
//! bits  16..32   current endurance     bits  72..80   equipped endurance bonus
//! bits  32..48   base endurance        bits  80..88   equipped defense bonus
//! bits  48..64   base combat           bits  88..96   equipped luck bonus
//! bits  64..80   base defense          bits  96..128  last heal timestamp
//! bits  80..96   base luck
//! bits  96..128  last update timestamp
//! ```
//!
//! Encoding rejects any value wider than its field instead of truncating it.
use tracing::warn;

use super::{Character, CharacterClass, CharacterFlags, EquipmentBonuses};
use crate::error::{ErrorCode, LedgerError};

/// Two-word ledger record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackedCharacter {
    pub core: u128,
    pub progression: u128,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Word {
    Core,
    Progression,
}

/// Every field stored in a [`PackedCharacter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum PackedField {
    Level,
    Flags,
    Class,
    CurrentEndurance,
    BaseEndurance,
    BaseCombat,
    BaseDefense,
    BaseLuck,
    LastUpdateAt,
    Experience,
    TotalKills,
    EquippedCombat,
    EquippedEndurance,
    EquippedDefense,
    EquippedLuck,
    LastHealAt,
}

impl PackedField {
    const fn word(self) -> Word {
        match self {
            Self::Level
            | Self::Flags
            | Self::Class
            | Self::CurrentEndurance
            | Self::BaseEndurance
            | Self::BaseCombat
            | Self::BaseDefense
            | Self::BaseLuck
            | Self::LastUpdateAt => Word::Core,
            _ => Word::Progression,
        }
    }

    /// `(shift, width)` of the field inside its word.
    const fn range(self) -> (u32, u32) {
        match self {
            Self::Level => (0, 8),
            Self::Flags => (8, 2),
            Self::Class => (10, 6),
            Self::CurrentEndurance => (16, 16),
            Self::BaseEndurance => (32, 16),
            Self::BaseCombat => (48, 16),
            Self::BaseDefense => (64, 16),
            Self::BaseLuck => (80, 16),
            Self::LastUpdateAt => (96, 32),
            Self::Experience => (0, 32),
            Self::TotalKills => (32, 32),
            Self::EquippedCombat => (64, 8),
            Self::EquippedEndurance => (72, 8),
            Self::EquippedDefense => (80, 8),
            Self::EquippedLuck => (88, 8),
            Self::LastHealAt => (96, 32),
        }
    }

    /// Largest value the field can hold.
    pub const fn max(self) -> u64 {
        let (_, width) = self.range();
        (1u64 << width) - 1
    }

    const fn mask(self) -> u128 {
        let (shift, _) = self.range();
        (self.max() as u128) << shift
    }
}

/// Codec failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PackError {
    #[error("{field} value {value} exceeds field maximum {max}")]
    Overflow {
        field: PackedField,
        value: u64,
        max: u64,
    },

    #[error("unknown character class {0}")]
    InvalidClass(u8),
}

impl From<PackError> for LedgerError {
    fn from(err: PackError) -> Self {
        match err {
            PackError::Overflow { .. } => LedgerError::new(ErrorCode::FieldOverflow),
            PackError::InvalidClass(_) => LedgerError::new(ErrorCode::CorruptedRecord),
        }
    }
}

#[derive(Default)]
struct WordWriter {
    core: u128,
    progression: u128,
}

impl WordWriter {
    fn put(&mut self, field: PackedField, value: u64) -> Result<(), PackError> {
        if value > field.max() {
            return Err(PackError::Overflow {
                field,
                value,
                max: field.max(),
            });
        }
        let (shift, _) = field.range();
        let bits = (value as u128) << shift;
        match field.word() {
            Word::Core => self.core |= bits,
            Word::Progression => self.progression |= bits,
        }
        Ok(())
    }
}

impl PackedCharacter {
    fn get(&self, field: PackedField) -> u64 {
        let word = match field.word() {
            Word::Core => self.core,
            Word::Progression => self.progression,
        };
        let (shift, _) = field.range();
        ((word & field.mask()) >> shift) as u64
    }

    /// Packs a character, failing on the first field that does not fit.
    pub fn encode(character: &Character) -> Result<Self, PackError> {
        let mut writer = WordWriter::default();
        writer.put(PackedField::Level, character.level.into())?;
        writer.put(PackedField::Flags, character.flags.bits().into())?;
        writer.put(PackedField::Class, character.class.index().into())?;
        writer.put(
            PackedField::CurrentEndurance,
            character.current_endurance.into(),
        )?;
        writer.put(PackedField::BaseEndurance, character.base_endurance.into())?;
        writer.put(PackedField::BaseCombat, character.base_combat.into())?;
        writer.put(PackedField::BaseDefense, character.base_defense.into())?;
        writer.put(PackedField::BaseLuck, character.base_luck.into())?;
        writer.put(PackedField::LastUpdateAt, character.last_update_at)?;

        writer.put(PackedField::Experience, character.experience)?;
        writer.put(PackedField::TotalKills, character.total_kills)?;
        writer.put(PackedField::EquippedCombat, character.equipment.combat.into())?;
        writer.put(
            PackedField::EquippedEndurance,
            character.equipment.endurance.into(),
        )?;
        writer.put(
            PackedField::EquippedDefense,
            character.equipment.defense.into(),
        )?;
        writer.put(PackedField::EquippedLuck, character.equipment.luck.into())?;
        writer.put(PackedField::LastHealAt, character.last_heal_at)?;

        Ok(Self {
            core: writer.core,
            progression: writer.progression,
        })
    }

    /// Unpacks a record.
    ///
    /// A stored `current_endurance` above the maximum is an integrity fault:
    /// it is clamped and logged rather than returned as-is.
    pub fn decode(&self) -> Result<Character, PackError> {
        let class_index = self.get(PackedField::Class) as u8;
        let class =
            CharacterClass::from_index(class_index).ok_or(PackError::InvalidClass(class_index))?;

        let mut character = Character {
            class,
            level: self.get(PackedField::Level) as u32,
            experience: self.get(PackedField::Experience),
            flags: CharacterFlags::from_bits_truncate(self.get(PackedField::Flags) as u8),
            current_endurance: self.get(PackedField::CurrentEndurance) as u32,
            base_endurance: self.get(PackedField::BaseEndurance) as u32,
            base_combat: self.get(PackedField::BaseCombat) as u32,
            base_defense: self.get(PackedField::BaseDefense) as u32,
            base_luck: self.get(PackedField::BaseLuck) as u32,
            equipment: EquipmentBonuses {
                combat: self.get(PackedField::EquippedCombat) as u32,
                endurance: self.get(PackedField::EquippedEndurance) as u32,
                defense: self.get(PackedField::EquippedDefense) as u32,
                luck: self.get(PackedField::EquippedLuck) as u32,
            },
            total_kills: self.get(PackedField::TotalKills),
            last_update_at: self.get(PackedField::LastUpdateAt),
            last_heal_at: self.get(PackedField::LastHealAt),
        };

        if character.clamp_endurance() {
            warn!(
                stored = self.get(PackedField::CurrentEndurance),
                max = character.max_endurance(),
                "character record endurance above maximum; clamped"
            );
        }

        Ok(character)
    }
}
