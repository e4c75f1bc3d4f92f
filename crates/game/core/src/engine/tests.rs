use super::*;
use crate::character::CharacterClass;
use crate::combat::EnemyBase;
use crate::event::FightOutcome;
use crate::treasury::{Hash32, hash_pair, leaf_hash};
use crate::types::{Epoch, UNIT};

const T0: Timestamp = 1_700_000_000;
const DAY: Timestamp = 86_400;

const WEAKLING: EnemyBase = EnemyBase {
    id: 1,
    combat: 1,
    endurance: 1,
    defense: 0,
    luck: 0,
    xp_reward: 50,
    drop_rate_bp: 0,
};

const TANK: EnemyBase = EnemyBase {
    id: 2,
    combat: 1,
    endurance: 60,
    defense: 0,
    luck: 0,
    xp_reward: 10,
    drop_rate_bp: 0,
};

const BRUTE: EnemyBase = EnemyBase {
    id: 3,
    combat: 200,
    endurance: 1_000,
    defense: 0,
    luck: 0,
    xp_reward: 10,
    drop_rate_bp: 0,
};

/// Dies in one hit but rates as a hard matchup, so the drop is certain.
const LOOT_PINATA: EnemyBase = EnemyBase {
    id: 4,
    combat: 14,
    endurance: 1,
    defense: 6,
    luck: 1,
    xp_reward: 10,
    drop_rate_bp: 10_000,
};

const SCHOLAR: EnemyBase = EnemyBase {
    id: 5,
    combat: 1,
    endurance: 1,
    defense: 0,
    luck: 0,
    xp_reward: 10_000,
    drop_rate_bp: 0,
};

fn admin() -> AccountId {
    AccountId::from_index(0)
}

fn alice() -> AccountId {
    AccountId::from_index(1)
}

fn bob() -> AccountId {
    AccountId::from_index(2)
}

fn roster() -> EnemyRoster {
    EnemyRoster::empty()
        .with_enemy(WEAKLING)
        .with_enemy(TANK)
        .with_enemy(BRUTE)
        .with_enemy(LOOT_PINATA)
        .with_enemy(SCHOLAR)
}

fn ledger_with(config: GameConfig) -> Ledger {
    let mut ledger = Ledger::new(config, roster(), admin(), T0, 7).unwrap();
    ledger.mint(alice(), 1_000 * UNIT);
    ledger.mint(bob(), 1_000 * UNIT);
    ledger
}

fn ledger() -> Ledger {
    ledger_with(GameConfig::default())
}

fn create(ledger: &mut Ledger, who: AccountId, class: CharacterClass) -> Vec<LedgerEvent> {
    let fee = ledger.config().fees.creation;
    ledger
        .execute(
            &CallContext::new(who, T0).with_value(fee),
            &LedgerCall::CreateCharacter {
                class: class.index(),
            },
        )
        .unwrap()
}

fn call(ledger: &mut Ledger, who: AccountId, now: Timestamp, call: LedgerCall) -> Result<Vec<LedgerEvent>, LedgerError> {
    ledger.execute(&CallContext::new(who, now), &call)
}

fn fight(ledger: &mut Ledger, who: AccountId, enemy: &EnemyBase) -> Result<Vec<LedgerEvent>, LedgerError> {
    call(
        ledger,
        who,
        T0,
        LedgerCall::FightEnemy {
            enemy_id: enemy.id,
            enemy_level: 1,
        },
    )
}

fn put_character(ledger: &mut Ledger, who: AccountId, character: &Character) {
    let packed = PackedCharacter::encode(character).unwrap();
    ledger.state.characters.insert(who, packed);
}

fn summary(events: &[LedgerEvent]) -> &crate::event::FightSummary {
    events
        .iter()
        .find_map(|event| match event {
            LedgerEvent::FightSummary(summary) => Some(summary),
            _ => None,
        })
        .expect("fight summary emitted")
}

fn error_code(result: Result<Vec<LedgerEvent>, LedgerError>) -> ErrorCode {
    result.unwrap_err().code
}

#[test]
fn create_character_charges_fee_and_registers_player() {
    let mut ledger = ledger();
    let events = create(&mut ledger, alice(), CharacterClass::Guardian);

    let fee = ledger.config().fees.creation;
    let LedgerEvent::FeeDistributed { payer, shares } = &events[0] else {
        panic!("expected fee distribution first, got {events:?}");
    };
    assert_eq!(*payer, alice());
    assert_eq!(shares.total(), fee);
    assert_eq!(ledger.state().pools.total(), fee);
    assert_eq!(ledger.state().balance(&alice()), 1_000 * UNIT - fee);
    assert!(matches!(
        events[1],
        LedgerEvent::CharacterCreated {
            class: CharacterClass::Guardian,
            ..
        }
    ));

    let character = ledger.character(&alice()).unwrap().unwrap();
    assert_eq!(character.level, 1);
    assert!(character.is_alive());
    assert_eq!(character.current_endurance, character.max_endurance());

    assert_eq!(
        ledger.query(&LedgerQuery::TotalPlayerCount, T0).unwrap(),
        QueryValue::U64(1)
    );
    assert_eq!(
        ledger.query(&LedgerQuery::PlayerByIndex(0), T0).unwrap(),
        QueryValue::Account(Some(alice()))
    );
    assert_eq!(
        ledger.query(&LedgerQuery::PlayerByIndex(1), T0).unwrap(),
        QueryValue::Account(None)
    );
}

#[test]
fn create_character_rejections() {
    let mut ledger = ledger();
    let fee = ledger.config().fees.creation;

    let short = ledger.execute(
        &CallContext::new(alice(), T0).with_value(fee - 1),
        &LedgerCall::CreateCharacter { class: 0 },
    );
    assert_eq!(error_code(short), ErrorCode::InsufficientFee);

    let bad_class = ledger.execute(
        &CallContext::new(alice(), T0).with_value(fee),
        &LedgerCall::CreateCharacter { class: 9 },
    );
    assert_eq!(error_code(bad_class), ErrorCode::InvalidClass);

    let broke = AccountId::from_index(99);
    let unfunded = ledger.execute(
        &CallContext::new(broke, T0).with_value(fee),
        &LedgerCall::CreateCharacter { class: 0 },
    );
    assert_eq!(error_code(unfunded), ErrorCode::InsufficientBalance);

    create(&mut ledger, alice(), CharacterClass::Warrior);
    let again = ledger.execute(
        &CallContext::new(alice(), T0).with_value(fee),
        &LedgerCall::CreateCharacter { class: 1 },
    );
    assert_eq!(error_code(again), ErrorCode::CharacterAlreadyExists);
}

#[test]
fn failed_call_leaves_state_untouched() {
    let mut ledger = ledger();
    create(&mut ledger, alice(), CharacterClass::Warrior);
    let before = ledger.state().clone();

    let result = call(
        &mut ledger,
        alice(),
        T0 + 3 * DAY,
        LedgerCall::FightEnemy {
            enemy_id: 77,
            enemy_level: 1,
        },
    );
    assert_eq!(error_code(result), ErrorCode::EnemyDoesNotExist);
    assert_eq!(ledger.state(), &before);

    let result = fight(&mut ledger, bob(), &WEAKLING);
    assert_eq!(error_code(result), ErrorCode::CharacterDoesNotExist);
    assert_eq!(ledger.state(), &before);
}

#[test]
fn invalid_enemy_level_is_rejected() {
    let mut ledger = ledger();
    create(&mut ledger, alice(), CharacterClass::Warrior);
    for level in [0, GameConfig::MAX_ENEMY_LEVEL + 1] {
        let result = call(
            &mut ledger,
            alice(),
            T0,
            LedgerCall::FightEnemy {
                enemy_id: WEAKLING.id,
                enemy_level: level,
            },
        );
        assert_eq!(error_code(result), ErrorCode::InvalidEnemyLevel);
    }
}

#[test]
fn victory_pays_xp_and_records_score() {
    let mut ledger = ledger();
    create(&mut ledger, alice(), CharacterClass::Warrior);

    let events = fight(&mut ledger, alice(), &WEAKLING).unwrap();
    let summary = summary(&events);
    assert_eq!(summary.outcome, FightOutcome::Victory);
    assert_eq!(summary.rounds.len(), 1);
    assert_eq!(summary.enemy_endurance, 0);

    let multiplier = events
        .iter()
        .find_map(|event| match event {
            LedgerEvent::DifficultyMultiplierApplied { multiplier_bp, .. } => Some(*multiplier_bp),
            _ => None,
        })
        .unwrap();
    let xp = adjusted_xp(WEAKLING.xp_reward, multiplier);
    assert!(events.contains(&LedgerEvent::FightXpReward {
        player: alice(),
        xp
    }));
    assert!(events.contains(&LedgerEvent::FightRecorded {
        epoch: 0,
        player: alice(),
        enemy_level: 1,
        is_kill: true,
        fight_score: xp,
    }));

    let character = ledger.character(&alice()).unwrap().unwrap();
    assert_eq!(character.total_kills, 1);
    assert_eq!(character.experience, xp);
    assert!(!character.in_combat());
    assert_eq!(ledger.state().epoch_score(alice(), 0), xp);
    assert!(ledger.combat_state(&alice()).is_none());
}

#[test]
fn large_xp_reward_levels_up_repeatedly() {
    let mut ledger = ledger();
    create(&mut ledger, alice(), CharacterClass::Warrior);

    let events = fight(&mut ledger, alice(), &SCHOLAR).unwrap();
    let level_ups: Vec<u32> = events
        .iter()
        .filter_map(|event| match event {
            LedgerEvent::LevelUp { new_level, .. } => Some(*new_level),
            _ => None,
        })
        .collect();

    let character = ledger.character(&alice()).unwrap().unwrap();
    assert!(character.level > 2);
    assert_eq!(level_ups, (2..=character.level).collect::<Vec<_>>());
    assert!(character.experience < crate::progression::xp_required_for_level(character.level));
    assert!(character.current_endurance <= character.max_endurance());
}

#[test]
fn certain_drop_equips_bonuses() {
    let config = GameConfig {
        max_drop_rate_bp: 10_000,
        ..GameConfig::default()
    };
    let mut ledger = ledger_with(config);
    create(&mut ledger, alice(), CharacterClass::Warrior);

    let events = fight(&mut ledger, alice(), &LOOT_PINATA).unwrap();
    assert_eq!(summary(&events).outcome, FightOutcome::Victory);
    let bonuses = events
        .iter()
        .find_map(|event| match event {
            LedgerEvent::EquipmentDropped { bonuses, .. } => Some(*bonuses),
            _ => None,
        })
        .expect("drop at 100% chance");

    assert_eq!(bonuses.combat, 1);
    assert!(bonuses.endurance <= 1 && bonuses.defense <= 1 && bonuses.luck <= 1);
    let character = ledger.character(&alice()).unwrap().unwrap();
    assert_eq!(character.equipment, bonuses);
    assert_eq!(character.total_combat(), character.base_combat + 1);
}

#[test]
fn smaller_drop_keeps_full_endurance_at_new_max() {
    let config = GameConfig {
        max_drop_rate_bp: 10_000,
        ..GameConfig::default()
    };
    let mut ledger = ledger_with(config);
    create(&mut ledger, alice(), CharacterClass::Warrior);

    let mut character = ledger.character(&alice()).unwrap().unwrap();
    character.equipment.endurance = 200;
    character.current_endurance = character.max_endurance();
    put_character(&mut ledger, alice(), &character);
    let boosted_max = character.max_endurance();

    let events = fight(&mut ledger, alice(), &LOOT_PINATA).unwrap();
    assert_eq!(summary(&events).outcome, FightOutcome::Victory);
    assert_eq!(summary(&events).player_endurance, boosted_max);
    assert!(events.iter().any(|event| matches!(event, LedgerEvent::EquipmentDropped { .. })));

    let character = ledger.character(&alice()).unwrap().unwrap();
    assert!(character.equipment.endurance <= 1);
    assert!(character.max_endurance() < boosted_max);
    assert_eq!(character.current_endurance, character.max_endurance());
}

#[test]
fn tight_budget_leaves_fight_unresolved_until_continued() {
    let mut ledger = ledger_with(GameConfig::default().with_rounds_per_call(1));
    create(&mut ledger, alice(), CharacterClass::Warrior);

    let events = fight(&mut ledger, alice(), &TANK).unwrap();
    let first = summary(&events);
    assert_eq!(first.outcome, FightOutcome::Unresolved);
    assert_eq!(first.rounds_elapsed, 1);

    let session = ledger.combat_state(&alice()).unwrap().clone();
    assert_eq!(session.rounds_elapsed, 1);
    let character = ledger.character(&alice()).unwrap().unwrap();
    assert!(character.in_combat());
    assert_eq!(character.current_endurance, first.player_start_endurance);

    assert_eq!(
        ledger.can_fight(&alice(), T0).unwrap().as_pair(),
        (false, "Character is in combat")
    );
    assert!(ledger.can_continue_fight(&alice()).unwrap().allowed);
    assert_eq!(
        error_code(fight(&mut ledger, alice(), &WEAKLING)),
        ErrorCode::CharacterInCombat
    );

    let mut last = None;
    for _ in 0..10 {
        let events = call(&mut ledger, alice(), T0, LedgerCall::ContinueFight).unwrap();
        let summary = summary(&events).clone();
        if summary.outcome != FightOutcome::Unresolved {
            last = Some(summary);
            break;
        }
    }
    let last = last.expect("fight resolves within ten continues");
    assert_eq!(last.outcome, FightOutcome::Victory);

    let character = ledger.character(&alice()).unwrap().unwrap();
    assert!(!character.in_combat());
    assert_eq!(character.current_endurance, last.player_endurance);
    assert!(ledger.combat_state(&alice()).is_none());

    let after = call(&mut ledger, alice(), T0, LedgerCall::ContinueFight);
    assert_eq!(error_code(after), ErrorCode::NoActiveCombat);
    assert_eq!(
        ledger.can_continue_fight(&alice()).unwrap().as_pair(),
        (false, "No active combat state")
    );
}

#[test]
fn flee_ends_session_without_rewards_or_death() {
    let mut ledger = ledger_with(GameConfig::default().with_rounds_per_call(1));
    create(&mut ledger, alice(), CharacterClass::Warrior);
    let started = fight(&mut ledger, alice(), &TANK).unwrap();
    let first = summary(&started).clone();

    let events = call(&mut ledger, alice(), T0, LedgerCall::FleeRound).unwrap();
    let fled = summary(&events);
    assert_eq!(fled.outcome, FightOutcome::Fled);
    assert!(fled.rounds.is_empty());
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, LedgerEvent::FightXpReward { .. }))
    );

    let character = ledger.character(&alice()).unwrap().unwrap();
    assert!(character.is_alive());
    assert!(!character.in_combat());
    assert_eq!(character.experience, 0);
    assert_eq!(character.current_endurance, first.player_endurance);
    assert!(ledger.combat_state(&alice()).is_none());

    let again = call(&mut ledger, alice(), T0, LedgerCall::FleeRound);
    assert_eq!(error_code(again), ErrorCode::NoActiveCombat);
}

#[test]
fn defeat_kills_character_and_resurrect_restores_half() {
    let mut ledger = ledger();
    create(&mut ledger, alice(), CharacterClass::Warrior);

    let events = fight(&mut ledger, alice(), &BRUTE).unwrap();
    assert_eq!(summary(&events).outcome, FightOutcome::Defeat);
    assert!(events.contains(&LedgerEvent::FightRecorded {
        epoch: 0,
        player: alice(),
        enemy_level: 1,
        is_kill: false,
        fight_score: 0,
    }));

    let character = ledger.character(&alice()).unwrap().unwrap();
    assert!(!character.is_alive());
    assert_eq!(character.current_endurance, 0);
    assert_eq!(
        ledger.can_fight(&alice(), T0).unwrap().as_pair(),
        (false, "Character is not alive")
    );
    assert!(ledger.can_resurrect(&alice()).unwrap().allowed);

    let mut dead = character.clone();
    dead.base_endurance = 21;
    put_character(&mut ledger, alice(), &dead);

    let fee = ledger.config().fees.resurrection;
    let events = ledger
        .execute(
            &CallContext::new(alice(), T0 + 10).with_value(fee),
            &LedgerCall::ResurrectCharacter,
        )
        .unwrap();
    assert!(events.contains(&LedgerEvent::CharacterResurrected {
        player: alice(),
        new_endurance: 10,
    }));
    let character = ledger.character(&alice()).unwrap().unwrap();
    assert!(character.is_alive());
    assert_eq!(character.current_endurance, 10);

    let again = ledger.execute(
        &CallContext::new(alice(), T0 + 10).with_value(fee),
        &LedgerCall::ResurrectCharacter,
    );
    assert_eq!(error_code(again), ErrorCode::CharacterAlreadyAlive);
}

#[test]
fn heal_restores_full_and_starts_cooldown() {
    let mut ledger = ledger();
    create(&mut ledger, alice(), CharacterClass::Warrior);
    let mut character = ledger.character(&alice()).unwrap().unwrap();
    character.current_endurance = 5;
    character.last_update_at = T0;
    put_character(&mut ledger, alice(), &character);

    let fee = ledger.config().fees.heal;
    let short = ledger.execute(
        &CallContext::new(alice(), T0).with_value(fee - 1),
        &LedgerCall::HealCharacter,
    );
    assert_eq!(error_code(short), ErrorCode::InsufficientFee);

    let events = ledger
        .execute(
            &CallContext::new(alice(), T0).with_value(fee),
            &LedgerCall::HealCharacter,
        )
        .unwrap();
    assert!(events.contains(&LedgerEvent::CharacterHealed {
        player: alice(),
        new_endurance: 20,
    }));

    let full = ledger.execute(
        &CallContext::new(alice(), T0 + 1).with_value(fee),
        &LedgerCall::HealCharacter,
    );
    assert_eq!(error_code(full), ErrorCode::AlreadyAtFullHealth);

    let mut hurt = ledger.character(&alice()).unwrap().unwrap();
    hurt.current_endurance = 1;
    hurt.last_update_at = T0 + 1;
    put_character(&mut ledger, alice(), &hurt);
    let cooling = ledger.execute(
        &CallContext::new(alice(), T0 + 1).with_value(fee),
        &LedgerCall::HealCharacter,
    );
    assert_eq!(error_code(cooling), ErrorCode::HealingOnCooldown);
    assert_eq!(
        ledger
            .query(&LedgerQuery::HealingCooldownRemaining(alice()), T0 + 1)
            .unwrap(),
        QueryValue::U64(ledger.config().healing_cooldown - 1)
    );
}

#[test]
fn passive_regeneration_is_lazy() {
    let mut ledger = ledger();
    create(&mut ledger, alice(), CharacterClass::Warrior);
    let mut character = ledger.character(&alice()).unwrap().unwrap();
    character.current_endurance = 0;
    character.last_update_at = T0;
    put_character(&mut ledger, alice(), &character);

    let half = T0 + ledger.config().regen_window / 2;
    assert_eq!(
        ledger
            .query(&LedgerQuery::PendingRegeneration(alice()), half)
            .unwrap(),
        QueryValue::U64(10)
    );
    assert_eq!(
        ledger
            .query(&LedgerQuery::EffectiveEndurance(alice()), half)
            .unwrap(),
        QueryValue::U64(10)
    );
    assert_eq!(ledger.character(&alice()).unwrap().unwrap().current_endurance, 0);
    assert!(ledger.can_fight(&alice(), half).unwrap().allowed);
    assert_eq!(
        ledger.can_fight(&alice(), T0).unwrap().reason,
        Some(ErrorCode::NoEndurance)
    );
}

#[test]
fn fights_pay_gas_refunds_from_pool() {
    let mut ledger = ledger();
    create(&mut ledger, alice(), CharacterClass::Warrior);
    let before = ledger.state().balance(&alice());
    let pool_before = ledger.state().pools.gas_refund;

    let events = fight(&mut ledger, alice(), &WEAKLING).unwrap();
    let refund = ledger.config().gas_refund.cap_per_fight;
    assert!(events.contains(&LedgerEvent::GasRefundIssued {
        player: alice(),
        epoch: 0,
        amount: refund,
    }));
    assert_eq!(ledger.state().balance(&alice()), before + refund);
    assert_eq!(ledger.state().pools.gas_refund, pool_before - refund);
    assert_eq!(ledger.state().refunds_used(alice(), 0), refund);
}

fn refunded(events: &[LedgerEvent]) -> Amount {
    events
        .iter()
        .filter_map(|event| match event {
            LedgerEvent::GasRefundIssued { amount, .. } => Some(*amount),
            _ => None,
        })
        .sum()
}

#[test]
fn continued_fight_pays_one_refund_when_it_ends() {
    let mut ledger = ledger_with(GameConfig::default().with_rounds_per_call(1));
    create(&mut ledger, alice(), CharacterClass::Warrior);
    let cap = ledger.config().gas_refund.cap_per_fight;
    let balance = ledger.state().balance(&alice());

    let opening = fight(&mut ledger, alice(), &TANK).unwrap();
    assert_eq!(summary(&opening).outcome, FightOutcome::Unresolved);
    assert_eq!(refunded(&opening), 0);

    let mut total = 0;
    let mut calls = 1;
    while ledger.combat_state(&alice()).is_some() {
        assert!(calls <= 10, "fight resolves within ten continues");
        let events = call(&mut ledger, alice(), T0, LedgerCall::ContinueFight).unwrap();
        let paid = refunded(&events);
        if summary(&events).outcome == FightOutcome::Unresolved {
            assert_eq!(paid, 0);
        }
        total += paid;
        calls += 1;
    }

    assert!(calls > 2);
    assert_eq!(total, cap);
    assert_eq!(ledger.state().refunds_used(alice(), 0), cap);
    assert!(ledger.state().balance(&alice()) >= balance + cap);
}

#[test]
fn epoch_rolls_lazily_on_next_call() {
    let mut ledger = ledger();
    create(&mut ledger, alice(), CharacterClass::Warrior);
    assert_eq!(ledger.current_epoch(T0 + 2 * DAY + 5), 2);
    assert_eq!(ledger.state().epoch.current, 0);

    let events = call(
        &mut ledger,
        alice(),
        T0 + 2 * DAY + 5,
        LedgerCall::FightEnemy {
            enemy_id: WEAKLING.id,
            enemy_level: 1,
        },
    )
    .unwrap();
    assert_eq!(events[0], LedgerEvent::EpochAdvanced { from: 0, to: 2 });
    assert_eq!(ledger.state().epoch.current, 2);
    assert_eq!(
        ledger
            .query(&LedgerQuery::EpochTimeRemaining, T0 + 2 * DAY + 5)
            .unwrap(),
        QueryValue::U64(DAY - 5)
    );
}

#[test]
fn admin_calls_require_admin() {
    let mut ledger = ledger();
    let result = call(
        &mut ledger,
        alice(),
        T0,
        LedgerCall::FundEpoch {
            epoch: 0,
            amount: 1,
        },
    );
    let err = result.unwrap_err();
    assert_eq!(err.code, ErrorCode::OnlyOwner);
    assert_eq!(err.account, Some(alice()));
}

fn claim_call(epoch: Epoch, index: u64, account: AccountId, amount: Amount, proof: Vec<Hash32>) -> LedgerCall {
    LedgerCall::ClaimReward {
        epoch,
        index,
        account,
        amount,
        proof,
    }
}

#[test]
fn reward_epoch_lifecycle() {
    let mut ledger = ledger();
    create(&mut ledger, alice(), CharacterClass::Warrior);
    let prize = ledger.state().pools.prize;
    assert!(prize > UNIT);

    assert_eq!(
        error_code(call(
            &mut ledger,
            admin(),
            T0,
            LedgerCall::FundEpoch { epoch: 0, amount: 0 }
        )),
        ErrorCode::NoFundsProvided
    );
    call(
        &mut ledger,
        admin(),
        T0,
        LedgerCall::FundEpoch {
            epoch: 0,
            amount: UNIT,
        },
    )
    .unwrap();
    assert_eq!(ledger.state().pools.prize, prize - UNIT);

    let alice_amount = 6 * UNIT / 10;
    let bob_amount = 4 * UNIT / 10;
    let alice_leaf = leaf_hash(0, 0, &alice(), alice_amount);
    let bob_leaf = leaf_hash(0, 1, &bob(), bob_amount);
    let root = hash_pair(&alice_leaf, &bob_leaf);

    let early = call(
        &mut ledger,
        admin(),
        T0,
        LedgerCall::PublishEpochRoot {
            epoch: 0,
            root,
            total_allocated: UNIT,
        },
    );
    assert_eq!(error_code(early), ErrorCode::InvalidEpoch);

    let published_at = T0 + DAY;
    call(
        &mut ledger,
        admin(),
        published_at,
        LedgerCall::PublishEpochRoot {
            epoch: 0,
            root,
            total_allocated: UNIT,
        },
    )
    .unwrap();

    let disputed = call(
        &mut ledger,
        alice(),
        published_at + 10,
        claim_call(0, 0, alice(), alice_amount, vec![bob_leaf]),
    );
    assert_eq!(error_code(disputed), ErrorCode::DisputeWindowActive);

    let open = published_at + ledger.config().dispute_window + 1;
    let balance = ledger.state().balance(&alice());
    call(
        &mut ledger,
        alice(),
        open,
        claim_call(0, 0, alice(), alice_amount, vec![bob_leaf]),
    )
    .unwrap();
    assert_eq!(ledger.state().balance(&alice()), balance + alice_amount);
    assert_eq!(
        ledger.query(&LedgerQuery::IsClaimed { epoch: 0, index: 0 }, open).unwrap(),
        QueryValue::Bool(true)
    );

    let twice = call(
        &mut ledger,
        alice(),
        open,
        claim_call(0, 0, alice(), alice_amount, vec![bob_leaf]),
    );
    assert_eq!(error_code(twice), ErrorCode::AlreadyClaimed);

    let forged = call(
        &mut ledger,
        bob(),
        open,
        claim_call(0, 1, bob(), UNIT, vec![alice_leaf]),
    );
    assert_eq!(error_code(forged), ErrorCode::InvalidProof);

    let active = call(
        &mut ledger,
        admin(),
        open,
        LedgerCall::RollUnclaimedFunds { epoch: 0 },
    );
    assert_eq!(error_code(active), ErrorCode::ClaimWindowActive);

    let expired_at = published_at + ledger.config().claim_window + 1;
    assert_eq!(
        ledger.query(&LedgerQuery::IsClaimWindowExpired(0), expired_at).unwrap(),
        QueryValue::Bool(true)
    );
    assert_eq!(
        ledger.query(&LedgerQuery::UnclaimedAmount(0), expired_at).unwrap(),
        QueryValue::Amount(bob_amount)
    );
    let late = call(
        &mut ledger,
        bob(),
        expired_at,
        claim_call(0, 1, bob(), bob_amount, vec![alice_leaf]),
    );
    assert_eq!(error_code(late), ErrorCode::ClaimWindowExpired);

    let next_epoch = ledger.state().pools.next_epoch;
    let events = call(
        &mut ledger,
        admin(),
        expired_at,
        LedgerCall::RollUnclaimedFunds { epoch: 0 },
    )
    .unwrap();
    assert!(events.contains(&LedgerEvent::UnclaimedFundsRolled {
        from_epoch: 0,
        amount: bob_amount,
    }));
    assert_eq!(ledger.state().pools.next_epoch, next_epoch + bob_amount);

    let rolled = call(
        &mut ledger,
        admin(),
        expired_at,
        LedgerCall::RollUnclaimedFunds { epoch: 0 },
    );
    assert_eq!(error_code(rolled), ErrorCode::NoUnclaimedFunds);

    let prize = ledger.state().pools.prize;
    let refund_closed = call(
        &mut ledger,
        admin(),
        expired_at,
        LedgerCall::FundEpoch {
            epoch: 0,
            amount: UNIT / 10,
        },
    );
    assert_eq!(error_code(refund_closed), ErrorCode::EpochClosed);
    assert_eq!(ledger.state().pools.prize, prize);
}

#[test]
fn reserves_move_into_prize_pool_and_never_go_negative() {
    let mut ledger = ledger();
    create(&mut ledger, alice(), CharacterClass::Warrior);
    let pools = ledger.state().pools;

    let events = call(
        &mut ledger,
        admin(),
        T0,
        LedgerCall::ConsumeEmergencyReserve {
            epoch: 0,
            amount: pools.emergency,
        },
    )
    .unwrap();
    assert!(events.contains(&LedgerEvent::EmergencyReserveConsumed {
        epoch: 0,
        amount: pools.emergency,
    }));
    assert_eq!(ledger.state().pools.emergency, 0);
    assert_eq!(ledger.state().pools.prize, pools.prize + pools.emergency);

    let overdraw = call(
        &mut ledger,
        admin(),
        T0,
        LedgerCall::ConsumeEpochReserve {
            epoch: 0,
            amount: pools.next_epoch + 1,
        },
    );
    assert_eq!(error_code(overdraw), ErrorCode::InsufficientPoolBalance);
    assert_eq!(ledger.state().pools.next_epoch, pools.next_epoch);
}

#[test]
fn queries_answer_read_surface() {
    let mut ledger = ledger();
    create(&mut ledger, alice(), CharacterClass::Warrior);

    assert_eq!(
        ledger.query(&LedgerQuery::XpRequiredForLevel(3), T0).unwrap(),
        QueryValue::U64(300)
    );
    assert_eq!(
        ledger.query(&LedgerQuery::IsInCombat(alice()), T0).unwrap(),
        QueryValue::Bool(false)
    );
    assert_eq!(
        ledger.query(&LedgerQuery::CanFight(alice()), T0).unwrap(),
        QueryValue::Eligibility(Eligibility::ALLOWED)
    );
    assert_eq!(
        ledger.query(&LedgerQuery::CanHeal(bob()), T0).unwrap(),
        QueryValue::Eligibility(Eligibility::deny(ErrorCode::CharacterDoesNotExist))
    );
    assert_eq!(
        ledger
            .query(
                &LedgerQuery::ScaledEnemy {
                    enemy_id: TANK.id,
                    level: 1
                },
                T0
            )
            .unwrap(),
        QueryValue::Enemy(crate::combat::scale_enemy_for_level(&TANK, 1))
    );
    assert_eq!(
        ledger
            .query(
                &LedgerQuery::ScaledEnemy {
                    enemy_id: 99,
                    level: 1
                },
                T0
            )
            .unwrap_err()
            .code,
        ErrorCode::EnemyDoesNotExist
    );
    assert_eq!(LedgerQuery::CurrentEpoch.name(), "current_epoch");
}

#[cfg(feature = "serde")]
#[test]
fn snapshot_round_trips() {
    let mut ledger = ledger_with(GameConfig::default().with_rounds_per_call(1));
    create(&mut ledger, alice(), CharacterClass::Rogue);
    fight(&mut ledger, alice(), &TANK).unwrap();

    let bytes = ledger.to_snapshot().unwrap();
    let restored = Ledger::from_snapshot(&bytes).unwrap();
    assert_eq!(restored, ledger);
    assert!(restored.combat_state(&alice()).is_some());
}
