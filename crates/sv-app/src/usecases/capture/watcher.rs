use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use sv_core::capture::{is_capturable, CaptureAction, PendingCapture, CAPTURE_BUTTONS};
use sv_core::config::CaptureConfig;
use sv_core::ids::NotificationId;
use sv_core::ports::{
    ActionNotification, ClockPort, NotificationError, NotificationPort, SnippetRepositoryPort,
    SystemClipboardPort,
};
use sv_core::snippet::{Snippet, Tag};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::timer::RepeatingTimer;

const NOTIFICATION_TITLE: &str = "Save clipboard to SnipVault?";
const PREVIEW_CHARS: usize = 120;

/// What a single clipboard poll did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing new on the clipboard.
    Idle,
    /// A prompt was raised for new content.
    Prompted(NotificationId),
    /// New content was seen but the prompt could not be shown.
    Skipped,
}

/// How a notification response was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Saved(Snippet),
    Discarded,
    /// No pending capture with that id.
    Unknown,
}

struct WatcherInner {
    clipboard: Arc<dyn SystemClipboardPort>,
    notifier: Arc<dyn NotificationPort>,
    snippets: Arc<dyn SnippetRepositoryPort>,
    clock: Arc<dyn ClockPort>,
    tag: Tag,
    pending_ttl: Duration,
    last_seen: Mutex<Option<String>>,
    pending: Mutex<HashMap<NotificationId, PendingCapture>>,
}

impl WatcherInner {
    async fn tick(&self) -> TickOutcome {
        self.expire_pending().await;

        let text = match self.clipboard.read_text() {
            Ok(Some(text)) => text,
            Ok(None) => return TickOutcome::Idle,
            Err(err) => {
                debug!(error = %err, "clipboard read failed");
                return TickOutcome::Idle;
            }
        };

        if !is_capturable(&text) {
            return TickOutcome::Idle;
        }
        {
            let mut last_seen = self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
            if last_seen.as_deref() == Some(text.as_str()) {
                return TickOutcome::Idle;
            }
            // Recorded before prompting so a failed prompt is not retried.
            *last_seen = Some(text.clone());
        }

        let notification = ActionNotification {
            title: NOTIFICATION_TITLE.to_string(),
            message: preview(&text),
            buttons: CAPTURE_BUTTONS.iter().map(|b| b.to_string()).collect(),
        };

        let id = NotificationId::new();
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), PendingCapture::new(text, self.clock.now()));

        match self.notifier.show(&id, notification).await {
            Ok(()) => {
                info!(%id, "capture prompt raised");
                TickOutcome::Prompted(id)
            }
            Err(err) => {
                self.take_pending(&id);
                match err {
                    NotificationError::PermissionDenied => {
                        warn!("notification permission denied, skipping capture prompt")
                    }
                    err => warn!(error = %err, "failed to raise capture prompt"),
                }
                TickOutcome::Skipped
            }
        }
    }

    fn take_pending(&self, id: &NotificationId) -> Option<PendingCapture> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    async fn dismiss(&self, id: &NotificationId) {
        if let Err(err) = self.notifier.dismiss(id).await {
            debug!(%id, error = %err, "failed to dismiss notification");
        }
    }

    async fn expire_pending(&self) {
        let now = self.clock.now();
        let expired: Vec<NotificationId> = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            let ids: Vec<_> = pending
                .iter()
                .filter(|(_, p)| p.is_expired(now, self.pending_ttl))
                .map(|(id, _)| id.clone())
                .collect();
            for id in &ids {
                pending.remove(id);
            }
            ids
        };

        for id in expired {
            info!(%id, "capture prompt expired");
            self.dismiss(&id).await;
        }
    }
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    let mut preview: String = trimmed.chars().take(PREVIEW_CHARS).collect();
    if trimmed.chars().count() > PREVIEW_CHARS {
        preview.push('…');
    }
    preview
}

/// Polls the clipboard and turns new text into a snippet once the user agrees.
///
/// ## Flow / 流程
/// `Idle → Detected → AwaitingUserDecision → Saved | Discarded`
///
/// - Content equal to the last detected value never prompts twice in a row.
/// - Button 0 saves with the sentinel tag; any other button discards.
/// - Prompts left unanswered past the TTL are dropped on a later tick.
pub struct CaptureWatcher {
    inner: Arc<WatcherInner>,
    timer: RepeatingTimer,
    poll_interval: Duration,
}

impl CaptureWatcher {
    pub fn new(
        clipboard: Arc<dyn SystemClipboardPort>,
        notifier: Arc<dyn NotificationPort>,
        snippets: Arc<dyn SnippetRepositoryPort>,
        clock: Arc<dyn ClockPort>,
        config: &CaptureConfig,
    ) -> Self {
        Self {
            inner: Arc::new(WatcherInner {
                clipboard,
                notifier,
                snippets,
                clock,
                tag: config.tag(),
                pending_ttl: config.pending_ttl(),
                last_seen: Mutex::new(None),
                pending: Mutex::new(HashMap::new()),
            }),
            timer: RepeatingTimer::new("capture"),
            poll_interval: config.poll_interval(),
        }
    }

    /// Start polling. Re-arming replaces the previous timer.
    pub fn arm(&self) {
        let inner = self.inner.clone();
        self.timer.arm(self.poll_interval, move || {
            let inner = inner.clone();
            async move {
                inner.tick().await;
            }
        });
        info!(interval = ?self.poll_interval, "capture watcher armed");
    }

    /// Stop polling. Pending prompts stay answerable.
    pub fn disarm(&self) {
        self.timer.disarm();
        info!("capture watcher disarmed");
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_armed()
    }

    /// Run one poll outside the timer.
    pub async fn tick(&self) -> TickOutcome {
        self.inner.tick().await
    }

    /// Apply the user's answer to a capture prompt.
    pub async fn resolve(&self, id: &NotificationId, button: usize) -> Result<Resolution> {
        let span = info_span!("usecase.capture_watcher.resolve", %id, button);

        async {
            let Some(pending) = self.inner.take_pending(id) else {
                debug!("no pending capture for notification");
                return Ok(Resolution::Unknown);
            };
            self.inner.dismiss(id).await;

            match CaptureAction::from_button(button) {
                CaptureAction::Save => {
                    let snippet = Snippet::new(
                        pending.text,
                        vec![self.inner.tag.clone()],
                        self.inner.clock.now(),
                    );
                    self.inner
                        .snippets
                        .prepend(snippet.clone())
                        .await
                        .context("failed to store captured clipboard text")?;
                    info!(snippet_id = %snippet.id, "clipboard capture saved");
                    Ok(Resolution::Saved(snippet))
                }
                CaptureAction::Ignore => {
                    info!("clipboard capture ignored");
                    Ok(Resolution::Discarded)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Drop a pending capture whose notification the host closed.
    pub fn discard(&self, id: &NotificationId) -> bool {
        let removed = self.inner.take_pending(id).is_some();
        if removed {
            debug!(%id, "pending capture discarded");
        }
        removed
    }

    pub fn pending_count(&self) -> usize {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
