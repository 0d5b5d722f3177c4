mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use sv_app::usecases::{CredentialManager, RestoreFromRemote, RestoreOutcome, SyncScheduler, SyncSnippets};
use sv_core::sync::{RemoteSnapshot, SyncFailure, SyncState};

use support::*;

const REMOTE_NAME: &str = "snipvault-backup.json";

fn sync_usecase(fakes: &Fakes) -> (Arc<CredentialManager>, Arc<SyncSnippets>) {
    let credentials = Arc::new(CredentialManager::new(fakes.provider.clone()));
    let sync = Arc::new(SyncSnippets::new(
        credentials.clone(),
        fakes.remote.clone(),
        fakes.snippets.clone(),
        fakes.settings.clone(),
        fakes.clock.clone(),
        REMOTE_NAME,
    ));
    (credentials, sync)
}

fn restore_usecase(fakes: &Fakes) -> RestoreFromRemote {
    let credentials = Arc::new(CredentialManager::new(fakes.provider.clone()));
    RestoreFromRemote::new(
        credentials,
        fakes.remote.clone(),
        fakes.snippets.clone(),
        REMOTE_NAME,
    )
}

fn uploaded(fakes: &Fakes) -> RemoteSnapshot {
    let bytes = fakes.remote.object(REMOTE_NAME).expect("remote object exists");
    RemoteSnapshot::from_json_bytes(&bytes).expect("snapshot decodes")
}

#[tokio::test]
async fn first_sync_creates_then_later_syncs_update() {
    let fakes = Fakes::new(Some("grant"));
    fakes.snippets.replace_all_sync(sample_snippets(3));
    let (_, sync) = sync_usecase(&fakes);

    let first = sync.execute().await;
    assert!(first.is_success());
    assert_eq!(fakes.remote.creates.load(Ordering::SeqCst), 1);
    assert_eq!(fakes.remote.updates.load(Ordering::SeqCst), 0);

    let second = sync.execute().await;
    assert!(second.is_success());
    assert_eq!(fakes.remote.creates.load(Ordering::SeqCst), 1);
    assert_eq!(fakes.remote.updates.load(Ordering::SeqCst), 1);

    let snapshot = uploaded(&fakes);
    assert_eq!(snapshot.snippets, fakes.snippets.snapshot());
    assert_eq!(snapshot.last_synced, start_time());
    assert_eq!(fakes.settings.current().last_sync_status, Some(second));
}

#[tokio::test]
async fn sync_without_credential_never_touches_remote() {
    let fakes = Fakes::new(None);
    let (_, sync) = sync_usecase(&fakes);

    let status = sync.execute().await;

    assert_eq!(status.failure(), Some(SyncFailure::NoAuth));
    assert_eq!(status.failure().map(|f| f.to_string()).as_deref(), Some("no auth"));
    assert_eq!(fakes.remote.total_calls(), 0);
    assert_eq!(fakes.provider.interactive_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        fakes.settings.current().last_sync_status.and_then(|s| s.failure()),
        Some(SyncFailure::NoAuth)
    );
}

#[tokio::test]
async fn rejected_credential_is_dropped_and_reacquired() {
    let fakes = Fakes::new(Some("grant"));
    let (credentials, sync) = sync_usecase(&fakes);

    fakes.remote.fail_with(Some(401));
    let status = sync.execute().await;
    assert_eq!(status.failure(), Some(SyncFailure::NoAuth));
    assert!(!credentials.has_credential());

    fakes.remote.fail_with(None);
    let status = sync.execute().await;
    assert!(status.is_success());
    assert_eq!(fakes.provider.silent_calls.load(Ordering::SeqCst), 2);

    let tokens = fakes.remote.tokens_seen.lock().unwrap().clone();
    assert_eq!(tokens.first().map(String::as_str), Some("token-1"));
    assert_eq!(tokens.last().map(String::as_str), Some("token-2"));
}

#[tokio::test]
async fn server_errors_report_network_and_keep_credential() {
    let fakes = Fakes::new(Some("grant"));
    let (credentials, sync) = sync_usecase(&fakes);
    fakes.remote.fail_with(Some(503));

    let status = sync.execute().await;

    assert_eq!(status.failure(), Some(SyncFailure::Network));
    assert!(credentials.has_credential());
}

#[tokio::test(start_paused = true)]
async fn five_minute_interval_syncs_immediately_then_every_five_minutes() {
    let fakes = Fakes::new(Some("grant"));
    let (_, sync) = sync_usecase(&fakes);
    let scheduler = SyncScheduler::new(sync);

    let immediate = scheduler.set_interval(5).expect("immediate attempt");
    assert!(immediate.await.unwrap().is_success());
    assert_eq!(fakes.remote.creates.load(Ordering::SeqCst), 1);
    assert!(uploaded(&fakes).snippets.is_empty());
    let created = fakes.remote.handle(REMOTE_NAME);

    tokio::time::sleep(Duration::from_secs(4 * 60)).await;
    assert_eq!(fakes.remote.finds.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_secs(6 * 60 + 1)).await;
    settle().await;
    assert_eq!(fakes.remote.finds.load(Ordering::SeqCst), 3);
    assert_eq!(fakes.remote.creates.load(Ordering::SeqCst), 1);
    assert_eq!(fakes.remote.updates.load(Ordering::SeqCst), 2);
    assert_eq!(fakes.remote.handle(REMOTE_NAME), created);
    assert_eq!(scheduler.state(), SyncState::Armed);
}

#[tokio::test(start_paused = true)]
async fn disabling_leaves_no_armed_timer() {
    let fakes = Fakes::new(Some("grant"));
    let (_, sync) = sync_usecase(&fakes);
    let scheduler = SyncScheduler::new(sync);

    if let Some(attempt) = scheduler.set_interval(3) {
        attempt.await.unwrap();
    }
    assert!(scheduler.is_armed());

    assert!(scheduler.set_interval(0).is_none());
    assert!(!scheduler.is_armed());
    assert_eq!(scheduler.state(), SyncState::Disabled);

    let before = fakes.remote.finds.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(30 * 60)).await;
    settle().await;
    assert_eq!(fakes.remote.finds.load(Ordering::SeqCst), before);
}

#[tokio::test(start_paused = true)]
async fn rearming_replaces_the_previous_timer() {
    let fakes = Fakes::new(Some("grant"));
    let (_, sync) = sync_usecase(&fakes);
    let scheduler = SyncScheduler::new(sync);

    if let Some(attempt) = scheduler.set_interval(5) {
        attempt.await.unwrap();
    }
    if let Some(attempt) = scheduler.set_interval(1) {
        attempt.await.unwrap();
    }
    assert_eq!(fakes.remote.finds.load(Ordering::SeqCst), 2);

    tokio::time::sleep(Duration::from_secs(10 * 60 + 1)).await;
    settle().await;

    // Ten one-minute ticks and nothing from the replaced five-minute timer.
    assert_eq!(fakes.remote.finds.load(Ordering::SeqCst), 12);
    assert_eq!(scheduler.interval_minutes(), 1);
}

#[tokio::test(start_paused = true)]
async fn tick_during_running_attempt_is_skipped() {
    let fakes = Fakes::new(Some("grant"));
    fakes.remote.set_upload_delay(Duration::from_secs(7 * 60));
    let (_, sync) = sync_usecase(&fakes);
    let scheduler = SyncScheduler::new(sync);

    let _immediate = scheduler.set_interval(5);
    assert!(scheduler.sync_now().is_none());

    tokio::time::sleep(Duration::from_secs(11 * 60)).await;
    settle().await;

    // t=0 ran until t=7, the t=5 tick was skipped, t=10 started a new attempt.
    assert_eq!(fakes.remote.finds.load(Ordering::SeqCst), 2);
    assert_eq!(fakes.remote.creates.load(Ordering::SeqCst), 1);
    assert!(scheduler.is_running());
}

#[tokio::test(start_paused = true)]
async fn disarming_mid_attempt_lets_it_finish_disabled() {
    let fakes = Fakes::new(Some("grant"));
    fakes.remote.set_upload_delay(Duration::from_secs(60));
    let (_, sync) = sync_usecase(&fakes);
    let scheduler = SyncScheduler::new(sync);

    let attempt = scheduler.set_interval(5).expect("immediate attempt");
    settle().await;
    scheduler.disarm();
    assert!(scheduler.is_running());
    assert!(scheduler.sync_now().is_none());

    assert!(attempt.await.unwrap().is_success());
    assert_eq!(scheduler.state(), SyncState::Disabled);
}

#[tokio::test]
async fn restore_replaces_local_collection() {
    let fakes = Fakes::new(Some("grant"));
    fakes.snippets.replace_all_sync(sample_snippets(3));
    let remote_snippets = sample_snippets(2);
    let bytes = RemoteSnapshot::new(remote_snippets.clone(), start_time())
        .to_json_bytes()
        .unwrap();
    fakes.remote.seed(REMOTE_NAME, bytes);

    let outcome = restore_usecase(&fakes).execute().await;

    assert_eq!(outcome, Ok(RestoreOutcome::Restored { count: 2 }));
    assert_eq!(fakes.snippets.snapshot(), remote_snippets);
}

#[tokio::test]
async fn restore_of_malformed_snapshot_leaves_local_untouched() {
    let fakes = Fakes::new(Some("grant"));
    let local = sample_snippets(3);
    fakes.snippets.replace_all_sync(local.clone());
    fakes.remote.seed(REMOTE_NAME, b"{\"not\": \"a snapshot\"".to_vec());

    let outcome = restore_usecase(&fakes).execute().await;

    assert_eq!(outcome, Err(SyncFailure::MalformedRemoteData));
    assert_eq!(fakes.snippets.snapshot(), local);
}

#[tokio::test]
async fn restore_without_remote_object_is_a_noop() {
    let fakes = Fakes::new(Some("grant"));
    let local = sample_snippets(1);
    fakes.snippets.replace_all_sync(local.clone());

    let outcome = restore_usecase(&fakes).execute().await;

    assert_eq!(outcome, Ok(RestoreOutcome::NoRemoteObject));
    assert_eq!(fakes.remote.downloads.load(Ordering::SeqCst), 0);
    assert_eq!(fakes.snippets.snapshot(), local);
}

#[tokio::test]
async fn restore_without_credential_reports_no_auth() {
    let fakes = Fakes::new(None);

    let outcome = restore_usecase(&fakes).execute().await;

    assert_eq!(outcome, Err(SyncFailure::NoAuth));
    assert_eq!(fakes.remote.total_calls(), 0);
}
