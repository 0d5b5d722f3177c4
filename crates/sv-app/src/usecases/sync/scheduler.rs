use std::sync::{Arc, Mutex, PoisonError};

use sv_core::sync::{SyncState, SyncStatus};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{info, info_span};

use super::sync_snippets::SyncSnippets;
use crate::timer::RepeatingTimer;

struct SchedulerInner {
    sync: Arc<SyncSnippets>,
    state: Mutex<SyncState>,
}

/// Releases the in-flight guard even if the attempt panics.
struct InFlight(Arc<SchedulerInner>);

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut state = self.0.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = state.finish();
    }
}

impl SchedulerInner {
    /// Start an attempt unless one is already running.
    ///
    /// The attempt runs in its own task so disarming the timer never cancels it.
    fn trigger(self: &Arc<Self>) -> Option<JoinHandle<SyncStatus>> {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match state.start_tick() {
                Some(next) => *state = next,
                None => {
                    info!("sync already in flight, skipping tick");
                    return None;
                }
            }
        }

        let guard = InFlight(self.clone());
        Some(tokio::spawn(async move {
            let status = guard.0.sync.execute().await;
            drop(guard);
            status
        }))
    }

    fn update(&self, f: impl FnOnce(SyncState) -> SyncState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = f(*state);
    }
}

/// Drives [`SyncSnippets`] on a recurring timer.
///
/// ## Behavior / 行为
/// - `set_interval(0)` disarms.
/// - `set_interval(m)` with `m > 0` syncs once immediately, then every `m` minutes.
/// - A tick that lands while an attempt is still running is skipped.
pub struct SyncScheduler {
    inner: Arc<SchedulerInner>,
    timer: RepeatingTimer,
    interval_minutes: Mutex<u32>,
}

impl SyncScheduler {
    pub fn new(sync: Arc<SyncSnippets>) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                sync,
                state: Mutex::new(SyncState::Disabled),
            }),
            timer: RepeatingTimer::new("sync"),
            interval_minutes: Mutex::new(0),
        }
    }

    /// Returns the immediate attempt, if one was started.
    pub fn set_interval(&self, minutes: u32) -> Option<JoinHandle<SyncStatus>> {
        let _span = info_span!("usecase.sync_scheduler.set_interval", minutes).entered();

        self.timer.disarm();
        self.inner.update(SyncState::disarm);
        *self
            .interval_minutes
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = minutes;

        if minutes == 0 {
            info!("sync disabled");
            return None;
        }

        let immediate = self.inner.trigger();

        let inner = self.inner.clone();
        self.timer
            .arm(Duration::from_secs(u64::from(minutes) * 60), move || {
                let inner = inner.clone();
                async move {
                    // Detached: the timer never waits on or cancels an attempt.
                    let _ = inner.trigger();
                }
            });
        self.inner.update(SyncState::arm);
        info!("sync armed");

        immediate
    }

    /// One manual attempt through the same in-flight guard as timer ticks.
    pub fn sync_now(&self) -> Option<JoinHandle<SyncStatus>> {
        self.inner.trigger()
    }

    pub fn disarm(&self) {
        self.set_interval(0);
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    pub fn state(&self) -> SyncState {
        *self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn interval_minutes(&self) -> u32 {
        *self
            .interval_minutes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
