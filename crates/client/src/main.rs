//! Brawler client binary.
//!
//! Starts a local ledger runtime, funds the configured player, and plays a
//! scripted session through the session orchestrator.
//!
//! # Architecture
//!
//! This is the composition root: it reads configuration from the environment
//! (`.env` is honoured), installs logging, builds the [`runtime::Runtime`], and
//! hands a [`runtime::RuntimeHandle`] to the [`demo::Demo`] driver. All game
//! rules live in `game-core`; all transaction lifecycle handling lives in
//! `client-core`.
mod config;
mod demo;
mod logging;

use anyhow::{Context, Result};
use runtime::Runtime;
use tracing::info;

use crate::config::ClientConfig;
use crate::demo::Demo;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let config = ClientConfig::from_env();
    let _log_guard = logging::setup_logging(config.log_dir.as_deref())?;

    info!(
        player = %config.player,
        clock = ?config.runtime.clock,
        snapshot = ?config.runtime.snapshot_path,
        "starting brawler"
    );

    let runtime = Runtime::builder()
        .config(config.runtime.clone())
        .fund(config.player, config.faucet)
        .build()
        .await
        .context("starting ledger runtime")?;

    let demo = Demo::new(runtime.handle(), config);
    let result = demo.run().await;
    drop(demo);

    runtime.shutdown().await.context("stopping ledger runtime")?;
    result
}
