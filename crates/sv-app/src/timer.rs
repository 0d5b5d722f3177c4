use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio::task::AbortHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::debug;

/// A recurring timer owned by one component.
///
/// At most one task is alive per instance: arming aborts the previous task
/// before spawning a new one. Dropping the timer disarms it.
pub struct RepeatingTimer {
    name: &'static str,
    handle: Mutex<Option<AbortHandle>>,
}

impl RepeatingTimer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handle: Mutex::new(None),
        }
    }

    /// Run `tick` every `period`, first at `now + period`.
    pub fn arm<F, Fut>(&self, period: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let mut guard = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = guard.take() {
            existing.abort();
        }

        let name = self.name;
        let start = Instant::now() + period;
        let task = tokio::spawn(async move {
            let mut interval = interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                debug!(timer = name, "tick");
                tick().await;
            }
        });

        *guard = Some(task.abort_handle());
        debug!(timer = name, ?period, "timer armed");
    }

    pub fn disarm(&self) {
        let mut guard = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = guard.take() {
            handle.abort();
            debug!(timer = self.name, "timer disarmed");
        }
    }

    pub fn is_armed(&self) -> bool {
        let guard = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RepeatingTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}
