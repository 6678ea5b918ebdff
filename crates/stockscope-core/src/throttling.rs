use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use tracing::trace;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Shared request budget for one upstream host.
///
/// Callers wait for budget instead of failing; concurrent peer lookups are
/// spread out rather than rejected.
#[derive(Clone)]
pub struct RequestThrottle {
    limiter: Arc<DirectRateLimiter>,
    requests_per_minute: u32,
}

impl RequestThrottle {
    pub fn per_minute(requests_per_minute: u32) -> Self {
        let limit = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: Arc::new(RateLimiter::direct(Quota::per_minute(limit))),
            requests_per_minute: limit.get(),
        }
    }

    /// Waits until one request fits the quota.
    pub async fn ready(&self) {
        if self.limiter.check().is_ok() {
            return;
        }
        trace!(
            requests_per_minute = self.requests_per_minute,
            "request budget exhausted, waiting"
        );
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for RequestThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestThrottle")
            .field("requests_per_minute", &self.requests_per_minute)
            .finish()
    }
}
