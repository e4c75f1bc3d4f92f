//! Normalization of ledger events into display-safe plain values.
//!
//! Amounts are 128-bit and some counters can exceed what a double holds
//! exactly, so every amount is rendered as a decimal string and any `u64`
//! above 2^53 - 1 is too. Accounts, roots and transaction ids are `0x` hex.
use serde::Serialize;
use serde_json::{Map, Value, json};

use client_blockchain_core::{BlockInfo, ChainEvent, TransactionId};
use game_core::{Amount, EquipmentBonuses, FightSummary, Hash32, LedgerEvent, PoolBalances};

/// Largest integer a double represents exactly.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// One event, flattened for presentation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DecodedEvent {
    /// Snake-case event name, e.g. `fight_summary`.
    pub kind: String,
    pub player: Option<String>,
    pub block: u64,
    pub timestamp: u64,
    pub transaction: String,
    pub data: Value,
}

impl DecodedEvent {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

pub fn decode_chain_event(event: &ChainEvent) -> DecodedEvent {
    decode_event(event.block, &event.transaction_id, &event.event)
}

pub fn decode_events(block: BlockInfo, tx: &TransactionId, events: &[LedgerEvent]) -> Vec<DecodedEvent> {
    events.iter().map(|event| decode_event(block, tx, event)).collect()
}

pub fn decode_event(block: BlockInfo, tx: &TransactionId, event: &LedgerEvent) -> DecodedEvent {
    DecodedEvent {
        kind: event.kind().to_string(),
        player: event.player().map(|player| player.to_string()),
        block: block.height,
        timestamp: block.timestamp,
        transaction: tx.to_string(),
        data: payload(event),
    }
}

pub fn amount(value: Amount) -> Value {
    Value::String(value.to_string())
}

pub fn wide(value: u64) -> Value {
    if value <= MAX_SAFE_INTEGER {
        Value::from(value)
    } else {
        Value::String(value.to_string())
    }
}

pub fn hash(value: &Hash32) -> Value {
    Value::String(format!("0x{}", hex::encode(value)))
}

fn payload(event: &LedgerEvent) -> Value {
    match event {
        LedgerEvent::CharacterCreated { player, class } => json!({
            "player": player.to_string(),
            "class": class.to_string(),
        }),
        LedgerEvent::CharacterHealed {
            player,
            new_endurance,
        }
        | LedgerEvent::CharacterResurrected {
            player,
            new_endurance,
        } => json!({
            "player": player.to_string(),
            "new_endurance": new_endurance,
        }),
        LedgerEvent::LevelUp { player, new_level } => json!({
            "player": player.to_string(),
            "new_level": new_level,
        }),
        LedgerEvent::FightSummary(summary) => fight_summary(summary),
        LedgerEvent::DifficultyMultiplierApplied {
            player,
            enemy_id,
            enemy_level,
            combat_index,
            multiplier_bp,
            base_xp,
            adjusted_xp,
            base_drop_rate_bp,
            adjusted_drop_rate_bp,
        } => json!({
            "player": player.to_string(),
            "enemy_id": enemy_id,
            "enemy_level": enemy_level,
            "combat_index": combat_index,
            "multiplier_bp": multiplier_bp,
            "base_xp": base_xp,
            "adjusted_xp": wide(*adjusted_xp),
            "base_drop_rate_bp": base_drop_rate_bp,
            "adjusted_drop_rate_bp": adjusted_drop_rate_bp,
        }),
        LedgerEvent::FightXpReward { player, xp } => json!({
            "player": player.to_string(),
            "xp": wide(*xp),
        }),
        LedgerEvent::EquipmentDropped {
            player,
            enemy_id,
            enemy_level,
            bonuses,
        } => json!({
            "player": player.to_string(),
            "enemy_id": enemy_id,
            "enemy_level": enemy_level,
            "bonuses": equipment(bonuses),
        }),
        LedgerEvent::FightRecorded {
            epoch,
            player,
            enemy_level,
            is_kill,
            fight_score,
        } => json!({
            "epoch": wide(*epoch),
            "player": player.to_string(),
            "enemy_level": enemy_level,
            "is_kill": is_kill,
            "fight_score": wide(*fight_score),
        }),
        LedgerEvent::FeeDistributed { payer, shares } => json!({
            "payer": payer.to_string(),
            "shares": pools(shares),
        }),
        LedgerEvent::GasRefundIssued {
            player,
            epoch,
            amount: refund,
        } => json!({
            "player": player.to_string(),
            "epoch": wide(*epoch),
            "amount": amount(*refund),
        }),
        LedgerEvent::EpochAdvanced { from, to } => json!({
            "from": wide(*from),
            "to": wide(*to),
        }),
        LedgerEvent::EpochFunded {
            epoch,
            amount: funded,
        } => json!({
            "epoch": wide(*epoch),
            "amount": amount(*funded),
        }),
        LedgerEvent::EpochRootPublished {
            epoch,
            root,
            total_allocated,
            published_at,
        } => json!({
            "epoch": wide(*epoch),
            "root": hash(root),
            "total_allocated": amount(*total_allocated),
            "published_at": wide(*published_at),
        }),
        LedgerEvent::Claimed {
            epoch,
            index,
            account,
            amount: claimed,
        } => json!({
            "epoch": wide(*epoch),
            "index": wide(*index),
            "account": account.to_string(),
            "amount": amount(*claimed),
        }),
        LedgerEvent::UnclaimedFundsRolled {
            from_epoch,
            amount: rolled,
        } => json!({
            "from_epoch": wide(*from_epoch),
            "amount": amount(*rolled),
        }),
        LedgerEvent::EpochReserveConsumed {
            epoch,
            amount: consumed,
        }
        | LedgerEvent::EmergencyReserveConsumed {
            epoch,
            amount: consumed,
        } => json!({
            "epoch": wide(*epoch),
            "amount": amount(*consumed),
        }),
    }
}

/// Per-round data as parallel arrays, one entry per round of this call.
fn fight_summary(summary: &FightSummary) -> Value {
    let rounds = &summary.rounds;
    json!({
        "player": summary.player.to_string(),
        "enemy_id": summary.enemy_id,
        "enemy_level": summary.enemy_level,
        "outcome": summary.outcome.to_string(),
        "victory": summary.victory(),
        "unresolved": summary.unresolved(),
        "fled": summary.outcome == game_core::FightOutcome::Fled,
        "rounds_elapsed": summary.rounds_elapsed,
        "player_start_endurance": summary.player_start_endurance,
        "player_endurance": summary.player_endurance,
        "enemy_start_endurance": summary.enemy_start_endurance,
        "enemy_endurance": summary.enemy_endurance,
        "player_damage": rounds.iter().map(|r| r.player_damage).collect::<Vec<_>>(),
        "enemy_damage": rounds.iter().map(|r| r.enemy_damage).collect::<Vec<_>>(),
        "player_critical": rounds.iter().map(|r| r.player_critical).collect::<Vec<_>>(),
        "enemy_critical": rounds.iter().map(|r| r.enemy_critical).collect::<Vec<_>>(),
    })
}

fn equipment(bonuses: &EquipmentBonuses) -> Value {
    json!({
        "combat": bonuses.combat,
        "endurance": bonuses.endurance,
        "defense": bonuses.defense,
        "luck": bonuses.luck,
    })
}

fn pools(shares: &PoolBalances) -> Value {
    let mut map = Map::new();
    map.insert("prize".into(), amount(shares.prize));
    map.insert("equipment".into(), amount(shares.equipment));
    map.insert("gas_refund".into(), amount(shares.gas_refund));
    map.insert("developer".into(), amount(shares.developer));
    map.insert("next_epoch".into(), amount(shares.next_epoch));
    map.insert("emergency".into(), amount(shares.emergency));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use game_core::{AccountId, FightOutcome, RoundLog, RoundRecord, UNIT};

    use super::*;

    const BLOCK: BlockInfo = BlockInfo {
        height: 7,
        timestamp: 1_700_000_000,
    };

    fn tx() -> TransactionId {
        TransactionId::from_bytes(vec![0xab, 0xcd])
    }

    #[test]
    fn amounts_become_strings() {
        let event = LedgerEvent::EpochFunded {
            epoch: 3,
            amount: 250 * UNIT,
        };
        let decoded = decode_event(BLOCK, &tx(), &event);
        assert_eq!(decoded.kind, "epoch_funded");
        assert_eq!(decoded.player, None);
        assert_eq!(decoded.block, 7);
        assert_eq!(decoded.data["epoch"], json!(3));
        assert_eq!(decoded.data["amount"], json!("250000000000000000000"));
    }

    #[test]
    fn wide_counters_switch_to_strings_past_the_safe_range() {
        assert_eq!(wide(MAX_SAFE_INTEGER), json!(MAX_SAFE_INTEGER));
        assert_eq!(wide(MAX_SAFE_INTEGER + 1), json!("9007199254740992"));
    }

    #[test]
    fn fight_summary_flattens_rounds() {
        let player = AccountId::from_index(1);
        let mut rounds = RoundLog::new();
        rounds.push(RoundRecord {
            round: 1,
            player_damage: 4,
            enemy_damage: 2,
            player_critical: true,
            enemy_critical: false,
        });
        rounds.push(RoundRecord {
            round: 2,
            player_damage: 3,
            enemy_damage: 0,
            player_critical: false,
            enemy_critical: false,
        });
        let event = LedgerEvent::FightSummary(FightSummary {
            player,
            enemy_id: 1,
            enemy_level: 2,
            rounds_elapsed: 2,
            player_start_endurance: 20,
            player_endurance: 18,
            enemy_start_endurance: 7,
            enemy_endurance: 0,
            outcome: FightOutcome::Victory,
            rounds,
        });

        let decoded = decode_event(BLOCK, &tx(), &event);
        assert_eq!(decoded.player.as_deref(), Some(player.to_string().as_str()));
        assert_eq!(decoded.data["outcome"], json!("victory"));
        assert_eq!(decoded.data["victory"], json!(true));
        assert_eq!(decoded.data["fled"], json!(false));
        assert_eq!(decoded.data["player_damage"], json!([4, 3]));
        assert_eq!(decoded.data["player_critical"], json!([true, false]));
    }

    #[test]
    fn roots_and_transactions_render_as_hex() {
        let event = LedgerEvent::EpochRootPublished {
            epoch: 1,
            root: [0x11; 32],
            total_allocated: 5,
            published_at: 10,
        };
        let decoded = decode_event(BLOCK, &tx(), &event);
        assert_eq!(decoded.transaction, "0xabcd");
        assert_eq!(decoded.data["root"], json!(format!("0x{}", "11".repeat(32))));

        let text = decoded.to_json().unwrap();
        assert!(text.contains("\"total_allocated\":\"5\""));
    }
}
