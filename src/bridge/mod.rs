//! # Host Bridge / 宿主桥接
//!
//! Newline-delimited JSON between the host application and the engine.
//!
//! - **stdin**: engine commands plus `notification_permission` answers
//! - **stdout**: host requests, acks and change-feed events
//!
//! Commands are queued to the engine in the order they are read; only the
//! wait for each ack runs on its own task, so a long interactive sign-in never
//! holds up a notification click. End of input shuts the engine down and
//! gives outstanding acks a short grace period.

mod messages;

pub use messages::{BridgeEvent, Inbound, InboundMessage, Outbound, ParseError};

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sv_app::{Ack, EngineCommand, EngineHandle};
use sv_core::ports::SnippetsChanged;
use sv_core::settings::SettingChange;
use sv_platform::{HostChannelNotifier, HostRequest};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const OUTBOUND_CHANNEL_CAPACITY: usize = 256;
const SHUTDOWN_ACK_GRACE: Duration = Duration::from_secs(2);

/// Engine-side feeds forwarded to the host.
pub struct BridgeChannels {
    pub host_requests: mpsc::Receiver<HostRequest>,
    pub settings_changes: broadcast::Receiver<SettingChange>,
    pub snippet_changes: broadcast::Receiver<SnippetsChanged>,
}

/// Serve the host until `reader` hits end of input or a `shutdown` command.
pub async fn serve<R, W>(
    engine: EngineHandle,
    notifier: Arc<HostChannelNotifier>,
    channels: BridgeChannels,
    reader: R,
    writer: W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (out_tx, out_rx) = mpsc::channel(OUTBOUND_CHANNEL_CAPACITY);
    let writer_task = tokio::spawn(write_lines(out_rx, writer));
    let forwarders = spawn_forwarders(channels, out_tx.clone());

    let result = read_commands(&engine, &notifier, reader, &out_tx).await;

    for task in &forwarders {
        task.abort();
    }
    drop(out_tx);
    let write_result = writer_task.await.context("bridge writer task failed")?;

    result?;
    write_result
}

async fn read_commands<R>(
    engine: &EngineHandle,
    notifier: &HostChannelNotifier,
    reader: R,
    out_tx: &mpsc::Sender<Outbound>,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut in_flight = Vec::new();

    while let Some(line) = lines.next_line().await.context("failed to read from host")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let inbound = match Inbound::parse(line) {
            Ok(inbound) => inbound,
            Err(err) => {
                warn!(error = %err, "rejected host message");
                emit(
                    out_tx,
                    BridgeEvent::Error {
                        request_id: None,
                        message: err.to_string(),
                    },
                )
                .await;
                continue;
            }
        };

        match inbound.message {
            InboundMessage::NotificationPermission { granted } => {
                info!(granted, "host notification permission");
                notifier.set_permitted(granted);
            }
            InboundMessage::Command(EngineCommand::Shutdown) => {
                if let Some(ack) =
                    submit(engine, inbound.request_id, EngineCommand::Shutdown, out_tx).await
                {
                    await_ack(inbound.request_id, ack, out_tx.clone()).await;
                }
                info!("shutdown requested by host");
                return Ok(());
            }
            InboundMessage::Command(command) => {
                in_flight.retain(|task: &JoinHandle<()>| !task.is_finished());
                if let Some(ack) = submit(engine, inbound.request_id, command, out_tx).await {
                    in_flight.push(tokio::spawn(await_ack(
                        inbound.request_id,
                        ack,
                        out_tx.clone(),
                    )));
                }
            }
        }
    }

    info!("host closed input, shutting down");
    if let Some(ack) = submit(engine, None, EngineCommand::Shutdown, out_tx).await {
        await_ack(None, ack, out_tx.clone()).await;
    }

    // A sign-in waiting on the host that just left would otherwise hold us here.
    let outstanding = async {
        for task in in_flight.iter_mut() {
            let _ = task.await;
        }
    };
    if tokio::time::timeout(SHUTDOWN_ACK_GRACE, outstanding).await.is_err() {
        warn!("abandoning commands still in flight at shutdown");
    }
    for task in &in_flight {
        task.abort();
    }
    Ok(())
}

/// Queue `command` on the engine, reporting a closed engine to the host.
async fn submit(
    engine: &EngineHandle,
    request_id: Option<u64>,
    command: EngineCommand,
    out_tx: &mpsc::Sender<Outbound>,
) -> Option<oneshot::Receiver<Ack>> {
    match engine.submit(command).await {
        Ok(ack) => Some(ack),
        Err(err) => {
            emit(
                out_tx,
                BridgeEvent::Error {
                    request_id,
                    message: format!("{err:#}"),
                },
            )
            .await;
            None
        }
    }
}

async fn await_ack(
    request_id: Option<u64>,
    ack: oneshot::Receiver<Ack>,
    out_tx: mpsc::Sender<Outbound>,
) {
    let event = match ack.await {
        Ok(result) => BridgeEvent::Ack { request_id, result },
        Err(_) => BridgeEvent::Error {
            request_id,
            message: "engine dropped the command".to_string(),
        },
    };
    emit(&out_tx, event).await;
}

async fn emit(out_tx: &mpsc::Sender<Outbound>, event: BridgeEvent) {
    if out_tx.send(Outbound::Event(event)).await.is_err() {
        debug!("bridge writer gone, dropping event");
    }
}

fn spawn_forwarders(channels: BridgeChannels, out_tx: mpsc::Sender<Outbound>) -> Vec<JoinHandle<()>> {
    let BridgeChannels {
        mut host_requests,
        mut settings_changes,
        mut snippet_changes,
    } = channels;

    let host_tx = out_tx.clone();
    let host = tokio::spawn(async move {
        while let Some(request) = host_requests.recv().await {
            if host_tx.send(Outbound::Host(request)).await.is_err() {
                break;
            }
        }
    });

    let settings_tx = out_tx.clone();
    let settings = tokio::spawn(async move {
        loop {
            match settings_changes.recv().await {
                Ok(change) => {
                    emit(&settings_tx, BridgeEvent::SettingsChanged { key: change.key }).await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "settings feed lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let snippets = tokio::spawn(async move {
        loop {
            match snippet_changes.recv().await {
                Ok(change) => {
                    emit(&out_tx, BridgeEvent::SnippetsChanged { count: change.count }).await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "snippets feed lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    vec![host, settings, snippets]
}

async fn write_lines<W>(mut out_rx: mpsc::Receiver<Outbound>, mut writer: W) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = out_rx.recv().await {
        let mut line = match message.to_line() {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "failed to encode outbound message");
                continue;
            }
        };
        line.push('\n');
        writer
            .write_all(line.as_bytes())
            .await
            .context("failed to write to host")?;
        writer.flush().await.context("failed to flush host output")?;
    }
    Ok(())
}
