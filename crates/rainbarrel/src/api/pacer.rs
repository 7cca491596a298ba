//! Proactive request pacing.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default request budget: the documented Raindrop limit is 120/min.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 120;

/// A proactive rate limiter applied before each API request.
///
/// Reactive backoff (429 handling) still applies on top; the pacer just
/// keeps a well-behaved client from hitting the limit in the first place.
#[derive(Clone)]
pub struct RequestPacer {
    inner: Arc<GovernorRateLimiter>,
}

impl RequestPacer {
    /// Create a pacer allowing `requests_per_minute` requests (minimum 1).
    #[must_use]
    pub fn per_minute(requests_per_minute: u32) -> Self {
        let rpm = NonZeroU32::new(requests_per_minute)
            .unwrap_or_else(|| NonZeroU32::new(1).expect("1 is non-zero"));
        Self {
            inner: Arc::new(RateLimiter::direct(Quota::per_minute(rpm))),
        }
    }

    /// Wait (asynchronously) until the next request is allowed.
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }
}
