use std::time::Duration;

use client_blockchain_core::{
    GameReader, LedgerTransport, Receipt, ReceiptOutcome, TransactionData, TransactionId,
    TransactionStatus, TransportError,
};
use game_core::{
    AccountId, CharacterClass, EnemyBase, EnemyRoster, ErrorCode, FightOutcome, LedgerCall,
    LedgerEvent, LedgerQuery, QueryValue, Timestamp, UNIT,
};
use runtime::{
    ClockMode, Event, FileSnapshotRepository, Runtime, RuntimeConfig, RuntimeError, RuntimeHandle,
    SnapshotRepository, Topic,
};

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

fn alice() -> AccountId {
    AccountId::from_index(1)
}

fn manual_config() -> RuntimeConfig {
    RuntimeConfig {
        roster: EnemyRoster::empty().with_enemy(WEAKLING),
        genesis: Some(T0),
        seed: Some(7),
        clock: ClockMode::Manual,
        ..RuntimeConfig::default()
    }
}

async fn start(config: RuntimeConfig) -> Runtime {
    Runtime::builder()
        .config(config)
        .fund(alice(), 100 * UNIT)
        .build()
        .await
        .unwrap()
}

fn create_tx() -> TransactionData {
    TransactionData::new(
        alice(),
        LedgerCall::CreateCharacter {
            class: CharacterClass::Warrior.index(),
        },
    )
    .with_value(15 * UNIT)
}

async fn finalized(handle: &RuntimeHandle, id: &TransactionId) -> Receipt {
    match handle.transaction_status(id).await.unwrap() {
        Some(TransactionStatus::Finalized(receipt)) => receipt,
        other => panic!("expected finalized receipt, got {other:?}"),
    }
}

async fn execute(handle: &RuntimeHandle, tx: TransactionData) -> Receipt {
    let id = handle.submit(tx).await.unwrap();
    assert_eq!(
        handle.transaction_status(&id).await.unwrap(),
        Some(TransactionStatus::Pending)
    );
    handle.mine_block().await.unwrap();
    finalized(handle, &id).await
}

#[tokio::test]
async fn create_character_through_a_block() {
    let runtime = start(manual_config()).await;
    let handle = runtime.handle();
    let mut character_events = handle.subscribe(Topic::Character);

    let receipt = execute(&handle, create_tx()).await;
    assert!(receipt.succeeded());
    assert_eq!(receipt.block.height, 1);
    assert!(
        receipt
            .events()
            .iter()
            .any(|e| matches!(e, LedgerEvent::CharacterCreated { player, .. } if *player == alice()))
    );

    match character_events.recv().await.unwrap() {
        Event::Ledger(event) => assert_eq!(event.transaction_id, receipt.transaction_id),
        other => panic!("unexpected event {other:?}"),
    }

    let character = handle.get_character(alice()).await.unwrap().unwrap();
    assert_eq!(character.level, 1);
    assert_eq!(handle.balance(alice()).await.unwrap(), 85 * UNIT);
    assert_eq!(handle.total_player_count().await.unwrap(), 1);
}

#[tokio::test]
async fn submission_checks_balance_including_queued_value() {
    let runtime = start(manual_config()).await;
    let handle = runtime.handle();

    let big = TransactionData::new(alice(), LedgerCall::HealCharacter).with_value(90 * UNIT);
    handle.submit(big).await.unwrap();

    let err = handle.submit(create_tx()).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::InsufficientFunds { required, available }
            if required == 15 * UNIT && available == 10 * UNIT
    ));

    let transport_err = handle.submit_transaction(create_tx()).await.unwrap_err();
    assert!(matches!(transport_err, TransportError::InsufficientFunds { .. }));
}

#[tokio::test]
async fn failed_calls_are_recorded_as_reverts() {
    let runtime = start(manual_config()).await;
    let handle = runtime.handle();

    let receipt = execute(&handle, TransactionData::new(alice(), LedgerCall::ContinueFight)).await;
    match receipt.outcome {
        ReceiptOutcome::Reverted { error } => assert_eq!(error.code, ErrorCode::CharacterDoesNotExist),
        other => panic!("expected revert, got {other:?}"),
    }
    assert_eq!(handle.balance(alice()).await.unwrap(), 100 * UNIT);
}

#[tokio::test]
async fn fight_resolves_and_reports_through_combat_topic() {
    let runtime = start(manual_config()).await;
    let handle = runtime.handle();
    execute(&handle, create_tx()).await;
    let mut combat = handle.subscribe(Topic::Combat);

    let fight = TransactionData::new(
        alice(),
        LedgerCall::FightEnemy {
            enemy_id: WEAKLING.id,
            enemy_level: 1,
        },
    );
    let receipt = execute(&handle, fight).await;
    let summary = receipt
        .events()
        .iter()
        .find_map(|e| match e {
            LedgerEvent::FightSummary(summary) => Some(summary.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(summary.outcome, FightOutcome::Victory);

    let mut saw_summary = false;
    while let Ok(Event::Ledger(event)) = combat.try_recv() {
        saw_summary |= matches!(event.event, LedgerEvent::FightSummary(_));
    }
    assert!(saw_summary);
    assert!(!handle.is_in_combat(alice()).await.unwrap());
    assert_eq!(handle.epoch_score(alice(), 0).await.unwrap(), summary_xp(&receipt));
}

fn summary_xp(receipt: &Receipt) -> u64 {
    receipt
        .events()
        .iter()
        .find_map(|e| match e {
            LedgerEvent::FightXpReward { xp, .. } => Some(*xp),
            _ => None,
        })
        .unwrap_or(0)
}

#[tokio::test]
async fn receipts_wait_for_confirmation_depth() {
    let runtime = start(RuntimeConfig {
        confirmation_depth: 1,
        ..manual_config()
    })
    .await;
    let handle = runtime.handle();

    let id = handle.submit(create_tx()).await.unwrap();
    handle.mine_block().await.unwrap();
    match handle.transaction_status(&id).await.unwrap() {
        Some(TransactionStatus::Confirming {
            block,
            confirmations,
        }) => {
            assert_eq!(block.height, 1);
            assert_eq!(confirmations, 0);
        }
        other => panic!("expected confirming, got {other:?}"),
    }

    handle.mine_block().await.unwrap();
    assert!(finalized(&handle, &id).await.succeeded());
}

#[tokio::test]
async fn finalized_receipts_expire_after_retention() {
    let runtime = start(RuntimeConfig {
        receipt_retention: 2,
        ..manual_config()
    })
    .await;
    let handle = runtime.handle();

    let id = handle.submit(create_tx()).await.unwrap();
    handle.mine_block().await.unwrap();
    assert!(finalized(&handle, &id).await.succeeded());

    handle.mine_block().await.unwrap();
    handle.mine_block().await.unwrap();
    assert!(matches!(
        handle.transaction_status(&id).await.unwrap(),
        Some(TransactionStatus::Finalized(_))
    ));

    handle.mine_block().await.unwrap();
    assert!(handle.transaction_status(&id).await.unwrap().is_none());
    assert!(matches!(
        handle.query_transaction(&id).await,
        Err(TransportError::TransactionNotFound(_))
    ));
}

#[tokio::test]
async fn transport_reports_unknown_transactions_and_queries() {
    let runtime = start(manual_config()).await;
    let handle = runtime.handle();

    let unknown = TransactionId::from_bytes(vec![0; 32]);
    assert!(matches!(
        handle.query_transaction(&unknown).await,
        Err(TransportError::TransactionNotFound(_))
    ));

    let denied = handle.can_fight(alice()).await.unwrap();
    assert_eq!(denied.as_pair(), (false, "Character does not exist"));

    assert!(matches!(
        LedgerTransport::query(
            &handle,
            &LedgerQuery::ScaledEnemy {
                enemy_id: 99,
                level: 1
            }
        )
        .await,
        Err(TransportError::Query(e)) if e.code == ErrorCode::EnemyDoesNotExist
    ));
    handle.health_check().await.unwrap();
}

#[tokio::test]
async fn advancing_time_rolls_epochs_and_stamps_blocks() {
    let runtime = start(manual_config()).await;
    let handle = runtime.handle();

    assert_eq!(handle.current_epoch().await.unwrap(), 0);
    let now = handle.advance_time(86_400).await.unwrap();
    assert_eq!(now, T0 + 86_400);
    assert_eq!(handle.current_epoch().await.unwrap(), 1);

    let block = handle.mine_block().await.unwrap();
    assert_eq!(block.timestamp, T0 + 86_400);
    assert_eq!(
        handle.query(LedgerQuery::EpochTimeRemaining).await.unwrap(),
        QueryValue::U64(86_400)
    );
}

#[tokio::test(start_paused = true)]
async fn interval_production_finalizes_without_manual_mining() {
    let runtime = start(RuntimeConfig {
        block_interval: Some(Duration::from_secs(2)),
        ..manual_config()
    })
    .await;
    let handle = runtime.handle();

    let id = handle.submit_transaction(create_tx()).await.unwrap();
    let receipt = handle
        .wait_for_receipt(&id, Duration::from_millis(250))
        .await
        .unwrap();
    assert!(receipt.succeeded());
    assert!(handle.latest_block().await.unwrap().height >= 1);
}

#[tokio::test]
async fn snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.bin");
    let config = RuntimeConfig {
        snapshot_path: Some(path.clone()),
        ..manual_config()
    };

    let runtime = start(config.clone()).await;
    let handle = runtime.handle();
    execute(&handle, create_tx()).await;
    drop(handle);
    runtime.shutdown().await.unwrap();

    assert!(FileSnapshotRepository::new(&path).unwrap().exists());

    let runtime = start(config).await;
    let handle = runtime.handle();
    assert!(handle.get_character(alice()).await.unwrap().is_some());
    assert_eq!(handle.latest_block().await.unwrap().height, 1);
    // Genesis funding only applies to fresh ledgers.
    assert_eq!(handle.balance(alice()).await.unwrap(), 85 * UNIT);
    drop(handle);
    runtime.shutdown().await.unwrap();
}
