//! Client-side request budget for rate-limited public price APIs.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Requests-per-window budget shared by clones of one adapter.
#[derive(Clone)]
pub struct RequestBudget {
    limiter: Arc<DirectRateLimiter>,
    per_minute: u32,
}

impl RequestBudget {
    pub fn per_minute(limit: u32) -> Self {
        let per_minute = limit.max(1);
        Self {
            limiter: Arc::new(RateLimiter::direct(quota_for(
                Duration::from_secs(60),
                per_minute,
            ))),
            per_minute,
        }
    }

    /// Consumes one unit of budget; `false` when the window is exhausted.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    pub fn limit(&self) -> u32 {
        self.per_minute
    }
}

impl std::fmt::Debug for RequestBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBudget")
            .field("per_minute", &self.per_minute)
            .finish()
    }
}

fn quota_for(window: Duration, limit: u32) -> Quota {
    let burst = NonZeroU32::new(limit.max(1)).unwrap_or(NonZeroU32::MIN);
    let period = Duration::from_secs_f64((window.as_secs_f64() / f64::from(burst.get())).max(0.001));
    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}
