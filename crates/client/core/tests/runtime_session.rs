use std::sync::Arc;
use std::time::Duration;

use client_blockchain_core::{GameReader, LocalWallet};
use client_core::{
    ActionPhase, ActionStatus, ClientContext, EventFilter, FailureCategory, OrchestratorConfig,
    RefreshScope, RewardTree, SessionOrchestrator, collect_scores,
};
use game_core::{
    AccountId, CharacterClass, EnemyBase, EnemyRoster, ErrorCode, FightOutcome, GameConfig,
    LedgerCall, LedgerEventKind, Timestamp, UNIT,
};
use runtime::{ClockMode, Runtime, RuntimeConfig, RuntimeHandle};

const T0: Timestamp = 1_700_000_000;

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

fn admin() -> AccountId {
    AccountId::from_index(0)
}

fn alice() -> AccountId {
    AccountId::from_index(1)
}

fn bob() -> AccountId {
    AccountId::from_index(2)
}

async fn start() -> Runtime {
    Runtime::builder()
        .config(RuntimeConfig {
            game_config: GameConfig::default().with_rounds_per_call(1),
            roster: EnemyRoster::empty().with_enemy(WEAKLING).with_enemy(TANK),
            admin: admin(),
            genesis: Some(T0),
            seed: Some(7),
            clock: ClockMode::Manual,
            block_interval: Some(Duration::from_secs(1)),
            ..RuntimeConfig::default()
        })
        .fund(alice(), 100 * UNIT)
        .fund(bob(), 100 * UNIT)
        .build()
        .await
        .unwrap()
}

fn session(handle: &RuntimeHandle, account: AccountId) -> SessionOrchestrator {
    let context = ClientContext::new(Arc::new(handle.clone()), Arc::new(LocalWallet::new(account)))
        .with_config(OrchestratorConfig {
            poll_interval: Duration::from_millis(100),
            ..OrchestratorConfig::default()
        });
    SessionOrchestrator::new(context)
}

fn create() -> LedgerCall {
    LedgerCall::CreateCharacter {
        class: CharacterClass::Warrior.index(),
    }
}

fn fight(enemy: &EnemyBase) -> LedgerCall {
    LedgerCall::FightEnemy {
        enemy_id: enemy.id,
        enemy_level: 1,
    }
}

#[tokio::test(start_paused = true)]
async fn create_and_fight_against_the_local_ledger() {
    let runtime = start().await;
    let handle = runtime.handle();
    let alice_session = session(&handle, alice());
    let mut refresh = alice_session.subscribe_refresh();

    let statuses = alice_session.submit(create()).unwrap().collect().await;
    let phases: Vec<_> = statuses.iter().map(ActionStatus::phase).collect();
    assert_eq!(
        phases,
        vec![ActionPhase::Pending, ActionPhase::Confirming, ActionPhase::Completed]
    );
    let ActionStatus::Completed(created) = &statuses[2] else {
        unreachable!()
    };
    assert!(created.events.iter().any(|e| e.kind == "character_created"));
    assert_eq!(handle.balance(alice()).await.unwrap(), 85 * UNIT);

    let signal = refresh.recv().await.unwrap();
    assert!(signal.scope.contains(RefreshScope::CHARACTER | RefreshScope::BALANCE));

    let won = alice_session
        .submit(fight(&WEAKLING))
        .unwrap()
        .finish()
        .await
        .unwrap();
    assert_eq!(won.fight.unwrap().outcome, FightOutcome::Victory);
    assert!(handle.epoch_score(alice(), 0).await.unwrap() > 0);
}

#[tokio::test(start_paused = true)]
async fn unresolved_fight_is_continued_to_the_end() {
    let runtime = start().await;
    let handle = runtime.handle();
    let alice_session = session(&handle, alice());
    alice_session.submit(create()).unwrap().finish().await.unwrap();

    let opened = alice_session.submit(fight(&TANK)).unwrap().finish().await.unwrap();
    assert!(opened.fight.unwrap().unresolved());
    assert!(handle.is_in_combat(alice()).await.unwrap());

    let mut last = None;
    for _ in 0..100 {
        let outcome = alice_session
            .submit(LedgerCall::ContinueFight)
            .unwrap()
            .finish()
            .await
            .unwrap();
        let summary = outcome.fight.unwrap();
        if !summary.unresolved() {
            last = Some(summary);
            break;
        }
    }
    assert!(last.is_some(), "fight never reached a terminal state");
    assert!(!handle.is_in_combat(alice()).await.unwrap());

    let failure = alice_session
        .submit(LedgerCall::ContinueFight)
        .unwrap()
        .finish()
        .await
        .unwrap_err();
    assert_eq!(failure.category, FailureCategory::Precondition);
    assert_eq!(failure.code, Some(ErrorCode::NoActiveCombat));
}

#[tokio::test(start_paused = true)]
async fn fight_ended_by_another_session_resolves_benignly() {
    let runtime = start().await;
    let handle = runtime.handle();
    let first = session(&handle, alice());
    let second = session(&handle, alice());

    first.submit(create()).unwrap().finish().await.unwrap();
    first.submit(fight(&TANK)).unwrap().finish().await.unwrap();

    let fled = second.submit(LedgerCall::FleeRound).unwrap().finish().await.unwrap();
    assert_eq!(fled.fight.unwrap().outcome, FightOutcome::Fled);

    let resolved = first
        .submit(LedgerCall::ContinueFight)
        .unwrap()
        .finish()
        .await
        .unwrap();
    assert!(resolved.already_resolved);
    assert!(resolved.refresh.contains(RefreshScope::COMBAT));
}

#[tokio::test(start_paused = true)]
async fn unfunded_account_cannot_create() {
    let runtime = start().await;
    let handle = runtime.handle();
    let carol = session(&handle, AccountId::from_index(3));

    let statuses = carol.submit(create()).unwrap().collect().await;
    let phases: Vec<_> = statuses.iter().map(ActionStatus::phase).collect();
    assert_eq!(phases, vec![ActionPhase::Pending, ActionPhase::Failed]);
    match statuses.last() {
        Some(ActionStatus::Failed(failure)) => {
            assert_eq!(failure.category, FailureCategory::InsufficientFunds)
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn subscription_sees_only_the_players_events() {
    let runtime = start().await;
    let handle = runtime.handle();
    let alice_session = session(&handle, alice());
    let bob_session = session(&handle, bob());
    let mut events = alice_session
        .subscribe_events(EventFilter::player(alice()).kinds([LedgerEventKind::CharacterCreated]))
        .unwrap();

    bob_session.submit(create()).unwrap().finish().await.unwrap();
    alice_session.submit(create()).unwrap().finish().await.unwrap();

    let observed = events.next().await.unwrap();
    assert_eq!(observed.decoded.kind, "character_created");
    assert_eq!(observed.decoded.player, Some(alice().to_string()));
    assert!(observed.refresh.contains(RefreshScope::CHARACTER));
    events.cancel();
}

#[tokio::test(start_paused = true)]
async fn reward_epoch_from_scores_to_claim() {
    let runtime = start().await;
    let handle = runtime.handle();
    let admin_session = session(&handle, admin());
    let alice_session = session(&handle, alice());
    let bob_session = session(&handle, bob());

    for player in [&alice_session, &bob_session] {
        player.submit(create()).unwrap().finish().await.unwrap();
        player.submit(fight(&WEAKLING)).unwrap().finish().await.unwrap();
    }

    handle.advance_time(86_400).await.unwrap();
    assert_eq!(handle.current_epoch().await.unwrap(), 1);

    let scores = collect_scores(&handle, 0).await.unwrap();
    assert_eq!(scores.len(), 2);
    assert!(scores.iter().all(|(_, score)| *score > 0));

    let budget = handle.pools().await.unwrap().prize / 2;
    admin_session
        .submit(LedgerCall::FundEpoch {
            epoch: 0,
            amount: budget,
        })
        .unwrap()
        .finish()
        .await
        .unwrap();

    let tree = RewardTree::from_scores(0, &scores, budget).unwrap();
    admin_session
        .submit(tree.publish_call())
        .unwrap()
        .finish()
        .await
        .unwrap();

    let entry = *tree.entry_for(alice()).unwrap();
    let claim = || tree.claim_call(entry.index).unwrap();

    let early = alice_session.submit(claim()).unwrap().finish().await.unwrap_err();
    assert_eq!(early.code, Some(ErrorCode::DisputeWindowActive));
    assert!(early.is_retryable());

    handle.advance_time(3_601).await.unwrap();
    let before = handle.balance(alice()).await.unwrap();
    let claimed = alice_session.submit(claim()).unwrap().finish().await.unwrap();
    assert!(claimed.refresh.contains(RefreshScope::CLAIMS));
    assert_eq!(handle.balance(alice()).await.unwrap(), before + entry.amount);
    assert!(handle.is_claimed(0, entry.index).await.unwrap());

    let again = alice_session.submit(claim()).unwrap().finish().await.unwrap_err();
    assert_eq!(again.category, FailureCategory::Reverted);
    assert_eq!(again.code, Some(ErrorCode::AlreadyClaimed));
}
