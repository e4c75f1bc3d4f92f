//! Scripted play session against the local ledger.
//!
//! Drives one player through character creation, a fight (continued until it
//! resolves), recovery, and optionally the full reward cycle for the epoch.
//! Every decoded event is printed to stdout as one JSON line.
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::sync::broadcast;
use tracing::{info, warn};

use client_blockchain_core::{GameBlockchain, GameReader, LocalWallet};
use client_core::{
    ActionOutcome, ActionStatus, ClientContext, RefreshSignal, RewardTree, SessionOrchestrator,
    collect_scores,
};
use game_core::{AccountId, CharacterClass, LedgerCall};
use runtime::RuntimeHandle;

use crate::config::ClientConfig;

pub struct Demo {
    handle: RuntimeHandle,
    config: ClientConfig,
    player: SessionOrchestrator,
    admin: SessionOrchestrator,
}

impl Demo {
    pub fn new(handle: RuntimeHandle, config: ClientConfig) -> Self {
        let ledger: Arc<dyn GameBlockchain> = Arc::new(handle.clone());
        let session = |account: AccountId| {
            let context = ClientContext::new(ledger.clone(), Arc::new(LocalWallet::new(account)))
                .with_config(config.orchestrator.clone());
            SessionOrchestrator::new(context)
        };
        let player = session(config.player);
        let admin = session(config.runtime.admin);
        Self {
            handle,
            config,
            player,
            admin,
        }
    }

    pub async fn run(&self) -> Result<()> {
        tokio::spawn(log_refresh(self.player.subscribe_refresh()));

        self.ensure_character().await?;
        self.recover().await?;
        self.fight().await?;

        if self.config.settle_epoch {
            self.settle_epoch().await?;
        }

        if let Some(character) = self.handle.get_character(self.config.player).await? {
            info!(
                level = character.level,
                experience = character.experience,
                kills = character.total_kills,
                endurance = character.current_endurance,
                "session finished"
            );
        }
        Ok(())
    }

    async fn ensure_character(&self) -> Result<()> {
        if self.handle.get_character(self.config.player).await?.is_some() {
            info!(player = %self.config.player, "character already exists");
            return Ok(());
        }
        self.act(
            &self.player,
            LedgerCall::CreateCharacter {
                class: CharacterClass::Warrior.index(),
            },
        )
        .await
        .context("creating character")?;
        Ok(())
    }

    /// Resurrect or heal when the ledger allows it; denial is not an error.
    async fn recover(&self) -> Result<()> {
        let account = self.config.player;
        if self.handle.can_resurrect(account).await?.allowed {
            self.act(&self.player, LedgerCall::ResurrectCharacter)
                .await
                .context("resurrecting")?;
        } else if self.handle.can_heal(account).await?.allowed {
            self.act(&self.player, LedgerCall::HealCharacter)
                .await
                .context("healing")?;
        }
        Ok(())
    }

    async fn fight(&self) -> Result<()> {
        let account = self.config.player;
        if !self.handle.is_in_combat(account).await? {
            let eligibility = self.handle.can_fight(account).await?;
            if !eligibility.allowed {
                warn!(reason = eligibility.as_pair().1, "cannot fight");
                return Ok(());
            }
            let opened = self
                .act(
                    &self.player,
                    LedgerCall::FightEnemy {
                        enemy_id: self.config.enemy_id,
                        enemy_level: self.config.enemy_level,
                    },
                )
                .await
                .context("starting fight")?;
            if !opened.fight.as_ref().is_some_and(|summary| summary.unresolved()) {
                return Ok(());
            }
        }

        for _ in 0..self.config.max_continues {
            let outcome = self
                .act(&self.player, LedgerCall::ContinueFight)
                .await
                .context("continuing fight")?;
            if outcome.already_resolved {
                return Ok(());
            }
            match outcome.fight {
                Some(summary) if summary.unresolved() => {}
                _ => return Ok(()),
            }
        }

        warn!(
            continues = self.config.max_continues,
            "fight still open, fleeing"
        );
        self.act(&self.player, LedgerCall::FleeRound)
            .await
            .context("fleeing")?;
        Ok(())
    }

    /// Close the epoch, fund and publish its reward tree, then claim.
    async fn settle_epoch(&self) -> Result<()> {
        let epoch = self.handle.current_epoch().await?;
        let remaining = self.handle.epoch_time_remaining().await?;
        self.handle.advance_time(remaining).await?;

        let scores = collect_scores(&self.handle, epoch).await?;
        let budget = self.handle.pools().await?.prize / 2;
        let tree = match RewardTree::from_scores(epoch, &scores, budget) {
            Ok(tree) => tree,
            Err(err) => {
                warn!(epoch, %err, "no rewards to distribute");
                return Ok(());
            }
        };
        info!(
            epoch,
            players = tree.entries().len(),
            allocated = %tree.total_allocated(),
            root = %hex::encode(tree.root()),
            "reward tree built"
        );

        self.act(&self.admin, LedgerCall::FundEpoch { epoch, amount: budget })
            .await
            .context("funding epoch")?;
        self.act(&self.admin, tree.publish_call())
            .await
            .context("publishing reward root")?;

        let Some(entry) = tree.entry_for(self.config.player).copied() else {
            info!(epoch, "player earned nothing this epoch");
            return Ok(());
        };
        let deadline = self.handle.claim_deadline(epoch).await?;
        let dispute = self.config.runtime.game_config.dispute_window;
        info!(epoch, ?deadline, dispute, "waiting out dispute window");
        self.handle.advance_time(dispute + 1).await?;

        let Some(claim) = tree.claim_call(entry.index) else {
            bail!("reward entry {} has no proof", entry.index);
        };
        self.act(&self.player, claim).await.context("claiming reward")?;
        Ok(())
    }

    /// Submit, report each status, and return the outcome.
    async fn act(&self, session: &SessionOrchestrator, call: LedgerCall) -> Result<ActionOutcome> {
        let mut action = session.submit(call)?;
        while let Some(status) = action.next().await {
            match status {
                ActionStatus::Pending { action: id, kind } => info!(action = %id, %kind, "pending"),
                ActionStatus::Confirming {
                    transaction_id,
                    block,
                } => info!(tx = %transaction_id, ?block, "confirming"),
                ActionStatus::Completed(outcome) => {
                    for event in &outcome.events {
                        println!("{}", event.to_json()?);
                    }
                    return Ok(outcome);
                }
                ActionStatus::Failed(failure) => {
                    return Err(failure.into());
                }
            }
        }
        bail!("action {} ended without a result", action.id())
    }
}

async fn log_refresh(mut signals: broadcast::Receiver<RefreshSignal>) {
    loop {
        match signals.recv().await {
            Ok(signal) => info!(
                action = %signal.action,
                kind = %signal.kind,
                scope = ?signal.scope,
                "refresh"
            ),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "refresh signals dropped")
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

