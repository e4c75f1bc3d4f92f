//! Character creation and paid recovery.
use tracing::info;

use super::{LedgerEngine, checks};
use crate::character::{Character, CharacterClass};
use crate::error::{ErrorCode, LedgerError};
use crate::event::LedgerEvent;
use crate::progression;

impl LedgerEngine<'_> {
    pub(super) fn create_character(&mut self, class: u8) -> Result<(), LedgerError> {
        let player = self.caller();
        if self.state.characters.contains_key(&player) {
            return Err(LedgerError::new(ErrorCode::CharacterAlreadyExists).for_account(player));
        }
        let class = CharacterClass::from_index(class)
            .ok_or_else(|| LedgerError::new(ErrorCode::InvalidClass).for_account(player))?;

        self.collect_fee(self.config.fees.creation)?;

        let character = Character::new(class, self.now());
        self.store(player, &character)?;
        self.state.players.push(player);

        info!(%player, %class, "character created");
        self.emit(LedgerEvent::CharacterCreated { player, class });
        Ok(())
    }

    pub(super) fn heal_character(&mut self) -> Result<(), LedgerError> {
        let player = self.caller();
        let mut character = self.load_settled(player)?;
        checks::heal(character.as_ref(), self.now(), self.config.healing_cooldown)
            .into_result()
            .map_err(|e| e.for_account(player))?;
        let Some(character) = character.as_mut() else {
            return Err(LedgerError::new(ErrorCode::CharacterDoesNotExist).for_account(player));
        };

        self.collect_fee(self.config.fees.heal)?;

        let new_endurance = progression::heal(character, self.now());
        self.store(player, character)?;
        self.emit(LedgerEvent::CharacterHealed {
            player,
            new_endurance,
        });
        Ok(())
    }

    pub(super) fn resurrect_character(&mut self) -> Result<(), LedgerError> {
        let player = self.caller();
        let mut character = self.load(player)?;
        checks::resurrect(character.as_ref())
            .into_result()
            .map_err(|e| e.for_account(player))?;
        let Some(character) = character.as_mut() else {
            return Err(LedgerError::new(ErrorCode::CharacterDoesNotExist).for_account(player));
        };

        self.collect_fee(self.config.fees.resurrection)?;

        let new_endurance = progression::resurrect(character, self.now());
        self.store(player, character)?;
        info!(%player, new_endurance, "character resurrected");
        self.emit(LedgerEvent::CharacterResurrected {
            player,
            new_endurance,
        });
        Ok(())
    }
}
