//! Engine facade: owns the scheduler and the capture watcher, keeps them in
//! line with the persisted schedule, and serves commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sv_core::config::AppConfig;
use sv_core::ids::{NotificationId, SnippetId};
use sv_core::ports::SettingsStorePort;
use sv_core::settings::ScheduleState;
use sv_core::sync::{SyncFailure, SyncStatus};
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::deps::EngineDeps;
use crate::usecases::{
    CaptureSelection, CaptureWatcher, CredentialManager, Resolution, RestoreFromRemote,
    RestoreOutcome, SyncScheduler, SyncSnippets,
};

/// Commands accepted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineCommand {
    SetSyncInterval { minutes: u32 },
    SetCaptureEnabled { enabled: bool },
    /// Interactive sign-in, then arm the default interval if sync is off.
    EnableSync,
    /// Revoke the credential and set the interval to 0.
    DisableSync,
    SyncNow,
    RestoreFromRemote,
    CaptureSelection { text: String },
    NotificationClicked { id: NotificationId, button: usize },
    NotificationClosed { id: NotificationId },
    Shutdown,
}

/// Acknowledgement returned for every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "ack", rename_all = "snake_case")]
pub enum Ack {
    Ok,
    SyncEnabled { interval_minutes: u32 },
    SyncDisabled { revoked: bool },
    Synced { status: SyncStatus },
    /// Another attempt was already running.
    SyncSkipped,
    Restored { count: usize },
    NoRemoteObject,
    Captured { snippet_id: SnippetId },
    Failed { reason: String },
}

impl Ack {
    fn failed(reason: impl std::fmt::Display) -> Self {
        Ack::Failed {
            reason: reason.to_string(),
        }
    }
}

pub type EngineRequest = (EngineCommand, oneshot::Sender<Ack>);

/// Sending side of the engine's command channel.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    pub fn new(tx: mpsc::Sender<EngineRequest>) -> Self {
        Self { tx }
    }

    /// Queue `command` and hand back the pending ack.
    ///
    /// The engine applies queued commands in queue order, so callers that
    /// need ordering submit inline and only wait for the ack elsewhere.
    pub async fn submit(&self, command: EngineCommand) -> Result<oneshot::Receiver<Ack>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send((command, reply_tx))
            .await
            .map_err(|_| anyhow::anyhow!("engine command channel closed"))?;
        Ok(reply_rx)
    }

    pub async fn send(&self, command: EngineCommand) -> Result<Ack> {
        let reply = self.submit(command).await?;
        reply.await.context("engine dropped the command")
    }
}

pub struct Engine {
    settings: Arc<dyn SettingsStorePort>,
    credentials: Arc<CredentialManager>,
    scheduler: SyncScheduler,
    capture: CaptureWatcher,
    capture_selection: CaptureSelection,
    restore: RestoreFromRemote,
    default_interval_minutes: u32,
    applied: Mutex<Option<ScheduleState>>,
}

impl Engine {
    pub fn new(deps: EngineDeps, config: &AppConfig) -> Self {
        let credentials = Arc::new(CredentialManager::new(deps.credentials));
        let remote_name = config.remote.file_name.clone();

        let sync = Arc::new(SyncSnippets::new(
            credentials.clone(),
            deps.remote.clone(),
            deps.snippets.clone(),
            deps.settings.clone(),
            deps.clock.clone(),
            remote_name.clone(),
        ));
        let capture = CaptureWatcher::new(
            deps.clipboard,
            deps.notifier,
            deps.snippets.clone(),
            deps.clock.clone(),
            &config.capture,
        );
        let capture_selection =
            CaptureSelection::new(deps.snippets.clone(), deps.clock, config.capture.tag());
        let restore =
            RestoreFromRemote::new(credentials.clone(), deps.remote, deps.snippets, remote_name);

        Self {
            settings: deps.settings,
            credentials,
            scheduler: SyncScheduler::new(sync),
            capture,
            capture_selection,
            restore,
            default_interval_minutes: config.sync.default_interval_minutes,
            applied: Mutex::new(None),
        }
    }

    pub fn scheduler(&self) -> &SyncScheduler {
        &self.scheduler
    }

    pub fn capture(&self) -> &CaptureWatcher {
        &self.capture
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    /// Load the persisted schedule and drive timers to match it.
    pub async fn start(&self) -> Result<()> {
        let span = info_span!("engine.start");
        async {
            let schedule = self.current_schedule().await?;
            info!(
                sync_interval_minutes = schedule.sync_interval_minutes,
                capture_enabled = schedule.capture_enabled,
                "engine starting"
            );
            self.apply(schedule).await;
            Ok(())
        }
        .instrument(span)
        .await
    }

    async fn current_schedule(&self) -> Result<ScheduleState> {
        let settings = self
            .settings
            .load()
            .await
            .context("failed to load shared settings")?;
        Ok(settings.schedule())
    }

    /// Bring timers in line with `schedule`. Unchanged parts are left alone.
    pub async fn apply(&self, schedule: ScheduleState) {
        let mut applied = self.applied.lock().await;
        let previous = *applied;

        if previous.map(|p| p.sync_interval_minutes) != Some(schedule.sync_interval_minutes) {
            // The immediate attempt runs detached.
            let _ = self.scheduler.set_interval(schedule.sync_interval_minutes);
        }

        if previous.map(|p| p.capture_enabled) != Some(schedule.capture_enabled) {
            if schedule.capture_enabled {
                self.capture.arm();
            } else {
                self.capture.disarm();
            }
        }

        *applied = Some(schedule);
    }

    async fn reload_and_apply(&self) {
        match self.current_schedule().await {
            Ok(schedule) => self.apply(schedule).await,
            Err(err) => warn!(error = %format!("{:#}", err), "failed to reload schedule"),
        }
    }

    pub async fn handle_command(&self, command: EngineCommand) -> Ack {
        let span = info_span!("engine.handle_command", command = command_name(&command));

        async {
            match command {
                EngineCommand::SetSyncInterval { minutes } => {
                    if let Err(err) = self.settings.set_sync_interval(minutes).await {
                        return Ack::failed(err);
                    }
                    self.reload_and_apply().await;
                    Ack::Ok
                }
                EngineCommand::SetCaptureEnabled { enabled } => {
                    if let Err(err) = self.settings.set_capture_enabled(enabled).await {
                        return Ack::failed(err);
                    }
                    self.reload_and_apply().await;
                    Ack::Ok
                }
                EngineCommand::EnableSync => self.enable_sync().await,
                EngineCommand::DisableSync => self.disable_sync().await,
                EngineCommand::SyncNow => match self.scheduler.sync_now() {
                    Some(attempt) => match attempt.await {
                        Ok(status) => Ack::Synced { status },
                        Err(err) => Ack::failed(err),
                    },
                    None => Ack::SyncSkipped,
                },
                EngineCommand::RestoreFromRemote => match self.restore.execute().await {
                    Ok(RestoreOutcome::Restored { count }) => Ack::Restored { count },
                    Ok(RestoreOutcome::NoRemoteObject) => Ack::NoRemoteObject,
                    Err(reason) => Ack::failed(reason),
                },
                EngineCommand::CaptureSelection { text } => {
                    match self.capture_selection.execute(text).await {
                        Ok(snippet) => Ack::Captured {
                            snippet_id: snippet.id,
                        },
                        Err(err) => Ack::failed(format!("{:#}", err)),
                    }
                }
                EngineCommand::NotificationClicked { id, button } => {
                    match self.capture.resolve(&id, button).await {
                        Ok(Resolution::Saved(snippet)) => Ack::Captured {
                            snippet_id: snippet.id,
                        },
                        Ok(Resolution::Discarded | Resolution::Unknown) => Ack::Ok,
                        Err(err) => Ack::failed(format!("{:#}", err)),
                    }
                }
                EngineCommand::NotificationClosed { id } => {
                    self.capture.discard(&id);
                    Ack::Ok
                }
                EngineCommand::Shutdown => {
                    self.shutdown();
                    Ack::Ok
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn enable_sync(&self) -> Ack {
        if !self.sign_in().await {
            return Ack::failed(SyncFailure::NoAuth);
        }
        self.finish_enable_sync().await
    }

    async fn sign_in(&self) -> bool {
        self.credentials
            .acquire(true)
            .instrument(info_span!("engine.sign_in"))
            .await
            .is_some()
    }

    /// Settings half of `EnableSync`, run once a credential is in hand.
    async fn finish_enable_sync(&self) -> Ack {
        let current = match self.current_schedule().await {
            Ok(schedule) => schedule.sync_interval_minutes,
            Err(err) => return Ack::failed(format!("{:#}", err)),
        };
        if current > 0 {
            let _ = self.scheduler.sync_now();
            return Ack::SyncEnabled {
                interval_minutes: current,
            };
        }

        let minutes = self.default_interval_minutes.max(1);
        if let Err(err) = self.settings.set_sync_interval(minutes).await {
            return Ack::failed(err);
        }
        self.reload_and_apply().await;
        Ack::SyncEnabled {
            interval_minutes: minutes,
        }
    }

    async fn disable_sync(&self) -> Ack {
        let revoked = self.credentials.revoke().await;
        if let Err(err) = self.settings.set_sync_interval(0).await {
            return Ack::failed(err);
        }
        self.reload_and_apply().await;
        Ack::SyncDisabled { revoked }
    }

    /// Stop both timers. In-flight sync attempts still complete.
    pub fn shutdown(&self) {
        self.scheduler.disarm();
        self.capture.disarm();
    }

    /// Serve commands and settings changes until `Shutdown` or channel close.
    ///
    /// Commands are applied one at a time in arrival order. Only the slow ones
    /// (the interactive sign-in of `EnableSync`, `SyncNow`, `RestoreFromRemote`)
    /// leave the loop; `EnableSync` comes back to it for its settings write.
    pub async fn run(self: Arc<Self>, mut requests: mpsc::Receiver<EngineRequest>) {
        let mut changes = self.settings.subscribe();
        let (signed_in_tx, mut signed_in) = mpsc::channel::<oneshot::Sender<Ack>>(8);
        info!("engine loop started");

        loop {
            tokio::select! {
                request = requests.recv() => {
                    let Some((command, reply)) = request else {
                        info!("command channel closed");
                        break;
                    };
                    match command {
                        EngineCommand::Shutdown => {
                            send_ack(reply, self.handle_command(command).await);
                            break;
                        }
                        EngineCommand::EnableSync => {
                            let engine = self.clone();
                            let signed_in_tx = signed_in_tx.clone();
                            tokio::spawn(async move {
                                if !engine.sign_in().await {
                                    send_ack(reply, Ack::failed(SyncFailure::NoAuth));
                                    return;
                                }
                                if let Err(mpsc::error::SendError(reply)) = signed_in_tx.send(reply).await {
                                    send_ack(reply, Ack::failed("engine stopped during sign-in"));
                                }
                            });
                        }
                        EngineCommand::SyncNow | EngineCommand::RestoreFromRemote => {
                            let engine = self.clone();
                            tokio::spawn(async move {
                                send_ack(reply, engine.handle_command(command).await);
                            });
                        }
                        command => send_ack(reply, self.handle_command(command).await),
                    }
                }
                Some(reply) = signed_in.recv() => {
                    let span = info_span!("engine.handle_command", command = "enable_sync");
                    send_ack(reply, self.finish_enable_sync().instrument(span).await);
                }
                change = changes.recv() => match change {
                    Ok(change) if change.key.affects_schedule() => {
                        debug!(key = ?change.key, "schedule setting changed");
                        self.reload_and_apply().await;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "settings change feed lagged, reloading");
                        self.reload_and_apply().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        error!("settings change feed closed");
                        break;
                    }
                },
            }
        }

        self.shutdown();
        info!("engine loop stopped");
    }
}

fn send_ack(reply: oneshot::Sender<Ack>, ack: Ack) {
    if reply.send(ack).is_err() {
        debug!("command sender went away before the ack");
    }
}

fn command_name(command: &EngineCommand) -> &'static str {
    match command {
        EngineCommand::SetSyncInterval { .. } => "set_sync_interval",
        EngineCommand::SetCaptureEnabled { .. } => "set_capture_enabled",
        EngineCommand::EnableSync => "enable_sync",
        EngineCommand::DisableSync => "disable_sync",
        EngineCommand::SyncNow => "sync_now",
        EngineCommand::RestoreFromRemote => "restore_from_remote",
        EngineCommand::CaptureSelection { .. } => "capture_selection",
        EngineCommand::NotificationClicked { .. } => "notification_clicked",
        EngineCommand::NotificationClosed { .. } => "notification_closed",
        EngineCommand::Shutdown => "shutdown",
    }
}
