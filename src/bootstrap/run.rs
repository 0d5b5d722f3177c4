use std::sync::Arc;

use anyhow::Context;
use sv_app::{Engine, EngineHandle};
use sv_core::config::AppConfig;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::info;

use super::paths::AppPaths;
use super::wiring::wire_dependencies;
use crate::bridge::{self, BridgeChannels};

const HOST_CHANNEL_CAPACITY: usize = 64;
const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Wire the engine, apply the persisted schedule and serve the host on
/// stdin/stdout until it goes away.
pub async fn run_app(config: AppConfig, paths: AppPaths) -> anyhow::Result<()> {
    info!(
        snippets = %paths.snippets_file.display(),
        settings = %paths.settings_file.display(),
        "starting snipvault engine"
    );

    let (host_tx, host_rx) = mpsc::channel(HOST_CHANNEL_CAPACITY);
    let wired = wire_dependencies(&config, &paths, host_tx).context("failed to wire engine")?;

    let channels = BridgeChannels {
        host_requests: host_rx,
        settings_changes: wired.deps.settings.subscribe(),
        snippet_changes: wired.deps.snippets.subscribe(),
    };

    let engine = Arc::new(Engine::new(wired.deps, &config));
    engine.start().await.context("failed to start engine")?;

    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let engine_task = tokio::spawn(engine.clone().run(command_rx));

    bridge::serve(
        EngineHandle::new(command_tx),
        wired.notifier,
        channels,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    engine_task.await.context("engine task failed")?;
    info!("snipvault engine stopped");
    Ok(())
}
