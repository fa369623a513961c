//! Repeating jobs keyed by id. Registering an id that is already scheduled
//! cancels the running job and replaces it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

const HOUR: u64 = 60 * 60;

/// Longest period a job may run on.
pub const MAX_PERIOD: Duration = Duration::from_secs(366 * 24 * HOUR);

/// Interprets a DCA frequency label. Unknown labels are not scheduled.
///
/// Accepts `hourly`, `daily`, `weekly`, `monthly` (30 days) and `every:<secs>`
/// up to [`MAX_PERIOD`].
pub fn frequency_period(label: &str) -> Option<Duration> {
    let label = label.trim().to_ascii_lowercase();
    let secs = match label.as_str() {
        "hourly" => HOUR,
        "daily" => 24 * HOUR,
        "weekly" => 7 * 24 * HOUR,
        "monthly" => 30 * 24 * HOUR,
        other => other.strip_prefix("every:")?.trim().parse::<u64>().ok()?,
    };
    let period = Duration::from_secs(secs);
    (secs > 0 && period <= MAX_PERIOD).then_some(period)
}

#[derive(Default)]
pub struct Scheduler {
    jobs: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<String, JoinHandle<()>>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `task` every `period`, first after one full period.
    ///
    /// Returns `false`, leaving any existing job under `id` untouched, when
    /// `period` is zero or above [`MAX_PERIOD`]. Must be called from within a
    /// tokio runtime.
    pub fn schedule<F, Fut>(&self, id: impl Into<String>, period: Duration, task: F) -> bool
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = id.into();
        let first_tick = Instant::now().checked_add(period);
        let Some(first_tick) = first_tick.filter(|_| !period.is_zero() && period <= MAX_PERIOD)
        else {
            warn!(
                job = %id,
                period_secs = period.as_secs(),
                "period out of range, job not scheduled"
            );
            return false;
        };

        // Spawn and swap under one guard: at most one live job per id.
        let mut jobs = self.jobs();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                task().await;
            }
        });
        if let Some(previous) = jobs.insert(id.clone(), handle) {
            previous.abort();
            debug!(job = %id, "replaced scheduled job");
        }
        drop(jobs);

        info!(job = %id, period_secs = period.as_secs(), "job scheduled");
        true
    }

    /// Cancels `id`; `false` when nothing was scheduled under it.
    pub fn cancel(&self, id: &str) -> bool {
        match self.jobs().remove(id) {
            Some(handle) => {
                handle.abort();
                info!(job = %id, "job cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_scheduled(&self, id: &str) -> bool {
        self.jobs()
            .get(id)
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn job_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.jobs().keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for (_, handle) in self.jobs().drain() {
            handle.abort();
        }
    }
}
