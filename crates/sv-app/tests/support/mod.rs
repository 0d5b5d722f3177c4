//! In-memory fakes for every engine port.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::{broadcast, Notify};

use sv_app::EngineDeps;
use sv_core::credential::Credential;
use sv_core::ids::{NotificationId, RemoteHandle, SnippetId};
use sv_core::ports::*;
use sv_core::settings::{SettingChange, SettingKey, SharedSettings};
use sv_core::snippet::Snippet;
use sv_core::sync::SyncStatus;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(start_time()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }
}

impl ClockPort for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ---------------------------------------------------------------------------
// Snippets
// ---------------------------------------------------------------------------

pub struct MemorySnippets {
    items: Mutex<Vec<Snippet>>,
    changes: broadcast::Sender<SnippetsChanged>,
}

impl MemorySnippets {
    pub fn new(items: Vec<Snippet>) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            items: Mutex::new(items),
            changes,
        }
    }

    pub fn snapshot(&self) -> Vec<Snippet> {
        self.items.lock().unwrap().clone()
    }

    pub fn replace_all_sync(&self, items: Vec<Snippet>) {
        *self.items.lock().unwrap() = items;
    }

    fn notify(&self) {
        let count = self.items.lock().unwrap().len();
        let _ = self.changes.send(SnippetsChanged { count });
    }
}

#[async_trait]
impl SnippetRepositoryPort for MemorySnippets {
    async fn list(&self) -> Result<Vec<Snippet>, SnippetRepositoryError> {
        Ok(self.snapshot())
    }

    async fn prepend(&self, snippet: Snippet) -> Result<(), SnippetRepositoryError> {
        self.items.lock().unwrap().insert(0, snippet);
        self.notify();
        Ok(())
    }

    async fn replace_all(&self, snippets: Vec<Snippet>) -> Result<(), SnippetRepositoryError> {
        *self.items.lock().unwrap() = snippets;
        self.notify();
        Ok(())
    }

    async fn upsert(&self, snippet: Snippet) -> Result<(), SnippetRepositoryError> {
        {
            let mut items = self.items.lock().unwrap();
            match items.iter_mut().find(|s| s.id == snippet.id) {
                Some(existing) => *existing = snippet,
                None => items.insert(0, snippet),
            }
        }
        self.notify();
        Ok(())
    }

    async fn remove(&self, id: &SnippetId) -> Result<bool, SnippetRepositoryError> {
        let removed = {
            let mut items = self.items.lock().unwrap();
            let before = items.len();
            items.retain(|s| &s.id != id);
            items.len() != before
        };
        if removed {
            self.notify();
        }
        Ok(removed)
    }

    fn subscribe(&self) -> broadcast::Receiver<SnippetsChanged> {
        self.changes.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

pub struct MemorySettings {
    settings: Mutex<SharedSettings>,
    changes: broadcast::Sender<SettingChange>,
}

impl MemorySettings {
    pub fn new(settings: SharedSettings) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            settings: Mutex::new(settings),
            changes,
        }
    }

    pub fn current(&self) -> SharedSettings {
        self.settings.lock().unwrap().clone()
    }

    /// Simulates another surface writing the shared settings.
    pub fn external_write(&self, update: impl FnOnce(&mut SharedSettings), key: SettingKey) {
        update(&mut self.settings.lock().unwrap());
        let _ = self.changes.send(SettingChange { key });
    }

    fn write(&self, update: impl FnOnce(&mut SharedSettings), key: SettingKey) {
        self.external_write(update, key);
    }
}

#[async_trait]
impl SettingsStorePort for MemorySettings {
    async fn load(&self) -> Result<SharedSettings, SettingsStoreError> {
        Ok(self.current())
    }

    async fn set_sync_interval(&self, minutes: u32) -> Result<(), SettingsStoreError> {
        self.write(
            |s| s.sync_interval_minutes = minutes,
            SettingKey::SyncIntervalMinutes,
        );
        Ok(())
    }

    async fn set_capture_enabled(&self, enabled: bool) -> Result<(), SettingsStoreError> {
        self.write(|s| s.capture_enabled = enabled, SettingKey::CaptureEnabled);
        Ok(())
    }

    async fn set_last_sync_status(&self, status: SyncStatus) -> Result<(), SettingsStoreError> {
        self.write(
            |s| s.last_sync_status = Some(status),
            SettingKey::LastSyncStatus,
        );
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SettingChange> {
        self.changes.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Remote store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeRemote {
    objects: Mutex<HashMap<String, (RemoteHandle, Vec<u8>)>>,
    failure: Mutex<Option<u16>>,
    upload_delay: Mutex<Option<Duration>>,
    pub finds: AtomicUsize,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
    pub downloads: AtomicUsize,
    pub tokens_seen: Mutex<Vec<String>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, name: &str, bytes: Vec<u8>) {
        self.objects
            .lock()
            .unwrap()
            .insert(name.to_string(), (RemoteHandle::from("seeded"), bytes));
    }

    pub fn object(&self, name: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(name)
            .map(|(_, bytes)| bytes.clone())
    }

    pub fn handle(&self, name: &str) -> Option<RemoteHandle> {
        self.objects
            .lock()
            .unwrap()
            .get(name)
            .map(|(handle, _)| handle.clone())
    }

    /// Every call fails with this HTTP status until cleared.
    pub fn fail_with(&self, status: Option<u16>) {
        *self.failure.lock().unwrap() = status;
    }

    pub fn set_upload_delay(&self, delay: Duration) {
        *self.upload_delay.lock().unwrap() = Some(delay);
    }

    pub fn total_calls(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
            + self.creates.load(Ordering::SeqCst)
            + self.updates.load(Ordering::SeqCst)
            + self.downloads.load(Ordering::SeqCst)
    }

    fn check(&self, credential: &Credential) -> Result<(), RemoteStoreError> {
        self.tokens_seen
            .lock()
            .unwrap()
            .push(credential.token.clone());
        match *self.failure.lock().unwrap() {
            Some(status @ (401 | 403)) => Err(RemoteStoreError::Unauthorized(status)),
            Some(status) => Err(RemoteStoreError::Network(format!("status {status}"))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteStorePort for FakeRemote {
    async fn find_object(
        &self,
        credential: &Credential,
        name: &str,
    ) -> Result<Option<RemoteHandle>, RemoteStoreError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.check(credential)?;
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(name)
            .map(|(handle, _)| handle.clone()))
    }

    async fn upload(
        &self,
        credential: &Credential,
        handle: Option<&RemoteHandle>,
        name: &str,
        payload: Vec<u8>,
    ) -> Result<RemoteHandle, RemoteStoreError> {
        let delay = *self.upload_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check(credential)?;

        let handle = match handle {
            Some(handle) => {
                self.updates.fetch_add(1, Ordering::SeqCst);
                handle.clone()
            }
            None => {
                self.creates.fetch_add(1, Ordering::SeqCst);
                RemoteHandle::new(format!("file-{}", self.creates.load(Ordering::SeqCst)))
            }
        };
        self.objects
            .lock()
            .unwrap()
            .insert(name.to_string(), (handle.clone(), payload));
        Ok(handle)
    }

    async fn download(
        &self,
        credential: &Credential,
        handle: &RemoteHandle,
    ) -> Result<Vec<u8>, RemoteStoreError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.check(credential)?;
        self.objects
            .lock()
            .unwrap()
            .values()
            .find(|(h, _)| h == handle)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| RemoteStoreError::UnexpectedStatus {
                status: 404,
                body: "not found".to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

pub struct FakeProvider {
    grant: Mutex<Option<String>>,
    interactive_token: Mutex<Option<String>>,
    issued: AtomicUsize,
    pub silent_calls: AtomicUsize,
    pub interactive_calls: AtomicUsize,
    pub revoked: Mutex<Vec<Option<String>>>,
}

impl FakeProvider {
    /// `grant` present means silent acquisition succeeds.
    pub fn new(grant: Option<&str>) -> Self {
        Self {
            grant: Mutex::new(grant.map(str::to_string)),
            interactive_token: Mutex::new(None),
            issued: AtomicUsize::new(0),
            silent_calls: AtomicUsize::new(0),
            interactive_calls: AtomicUsize::new(0),
            revoked: Mutex::new(Vec::new()),
        }
    }

    /// Lets the interactive flow succeed and cache a grant.
    pub fn allow_interactive(&self) {
        *self.interactive_token.lock().unwrap() = Some("granted".to_string());
    }

    pub fn has_grant(&self) -> bool {
        self.grant.lock().unwrap().is_some()
    }

    fn issue(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        format!("token-{n}")
    }
}

#[async_trait]
impl CredentialProviderPort for FakeProvider {
    async fn acquire_silent(&self) -> Result<Option<String>, CredentialError> {
        self.silent_calls.fetch_add(1, Ordering::SeqCst);
        if self.grant.lock().unwrap().is_some() {
            Ok(Some(self.issue()))
        } else {
            Ok(None)
        }
    }

    async fn acquire_interactive(&self) -> Result<String, CredentialError> {
        self.interactive_calls.fetch_add(1, Ordering::SeqCst);
        let grant = self.interactive_token.lock().unwrap().clone();
        match grant {
            Some(grant) => {
                *self.grant.lock().unwrap() = Some(grant);
                Ok(self.issue())
            }
            None => Err(CredentialError::Denied),
        }
    }

    async fn revoke(&self, access_token: Option<&str>) -> Result<(), CredentialError> {
        self.revoked
            .lock()
            .unwrap()
            .push(access_token.map(str::to_string));
        *self.grant.lock().unwrap() = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Clipboard and notifications
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeClipboard {
    text: Mutex<Option<String>>,
    denied: AtomicBool,
}

impl FakeClipboard {
    pub fn set(&self, text: &str) {
        *self.text.lock().unwrap() = Some(text.to_string());
    }

    /// While set, reads fail the way a host without clipboard permission does.
    pub fn fail_reads(&self, denied: bool) {
        self.denied.store(denied, Ordering::SeqCst);
    }
}

impl SystemClipboardPort for FakeClipboard {
    fn read_text(&self) -> Result<Option<String>, ClipboardReadError> {
        if self.denied.load(Ordering::SeqCst) {
            return Err(ClipboardReadError::PermissionDenied);
        }
        Ok(self.text.lock().unwrap().clone())
    }
}

pub struct FakeNotifier {
    permitted: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
    pub shown: Mutex<Vec<(NotificationId, ActionNotification)>>,
    pub dismissed: Mutex<Vec<NotificationId>>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self {
            permitted: AtomicBool::new(true),
            gate: Mutex::new(None),
            shown: Mutex::new(Vec::new()),
            dismissed: Mutex::new(Vec::new()),
        }
    }

    pub fn deny(&self) {
        self.permitted.store(false, Ordering::SeqCst);
    }

    /// Hold every `show` call, after recording it, until the returned gate is notified.
    pub fn hold_show(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn shown_count(&self) -> usize {
        self.shown.lock().unwrap().len()
    }

    pub fn last_shown(&self) -> Option<(NotificationId, ActionNotification)> {
        self.shown.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl NotificationPort for FakeNotifier {
    async fn show(
        &self,
        id: &NotificationId,
        notification: ActionNotification,
    ) -> Result<(), NotificationError> {
        if !self.permitted.load(Ordering::SeqCst) {
            return Err(NotificationError::PermissionDenied);
        }
        self.shown.lock().unwrap().push((id.clone(), notification));
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(())
    }

    async fn dismiss(&self, id: &NotificationId) -> Result<(), NotificationError> {
        self.dismissed.lock().unwrap().push(id.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub struct Fakes {
    pub snippets: Arc<MemorySnippets>,
    pub settings: Arc<MemorySettings>,
    pub remote: Arc<FakeRemote>,
    pub provider: Arc<FakeProvider>,
    pub clipboard: Arc<FakeClipboard>,
    pub notifier: Arc<FakeNotifier>,
    pub clock: Arc<ManualClock>,
}

impl Fakes {
    pub fn new(grant: Option<&str>) -> Self {
        Self {
            snippets: Arc::new(MemorySnippets::new(Vec::new())),
            settings: Arc::new(MemorySettings::new(SharedSettings::default())),
            remote: Arc::new(FakeRemote::new()),
            provider: Arc::new(FakeProvider::new(grant)),
            clipboard: Arc::new(FakeClipboard::default()),
            notifier: Arc::new(FakeNotifier::new()),
            clock: Arc::new(ManualClock::new()),
        }
    }

    pub fn deps(&self) -> EngineDeps {
        EngineDeps {
            snippets: self.snippets.clone(),
            settings: self.settings.clone(),
            remote: self.remote.clone(),
            credentials: self.provider.clone(),
            clipboard: self.clipboard.clone(),
            notifier: self.notifier.clone(),
            clock: self.clock.clone(),
        }
    }
}

pub fn sample_snippets(n: usize) -> Vec<Snippet> {
    (0..n)
        .map(|i| Snippet::new(format!("snippet {i}"), vec![], start_time()))
        .collect()
}

/// Let spawned tasks run without moving the paused clock forward much.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
