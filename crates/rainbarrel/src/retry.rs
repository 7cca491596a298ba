//! Retry and backoff primitives for remote operations.
//!
//! Retry policy is composed explicitly at the call site: the caller builds a
//! [`RetryRunner`], hands it the fallible operation as a closure, and supplies
//! a classifier that decides which errors are transient. A server-supplied
//! wait hint (e.g. `Retry-After`) always takes precedence over the computed
//! backoff.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

/// Initial backoff delay.
pub const INITIAL_BACKOFF_MS: u64 = 1_000;

/// Maximum backoff delay.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Default attempt budget for a single remote operation.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Full-jitter exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Base delay for the first retry.
    pub base: Duration,
    /// Upper bound on any computed delay.
    pub cap: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(INITIAL_BACKOFF_MS),
            cap: Duration::from_millis(MAX_BACKOFF_MS),
        }
    }
}

impl BackoffPolicy {
    #[must_use]
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap }
    }

    /// Compute the delay before the next attempt.
    ///
    /// An explicit wait hint is returned verbatim. Otherwise the delay is a
    /// uniformly random duration in `[0, min(cap, base * 2^attempt)]`.
    #[must_use]
    pub fn delay(&self, attempt: u32, explicit_wait: Option<Duration>) -> Duration {
        let fraction = rand::thread_rng().gen_range(0.0..=1.0);
        self.delay_with_fraction(attempt, explicit_wait, fraction)
    }

    /// Deterministic variant of [`delay`](Self::delay) with the jitter
    /// fraction injected. `fraction` is clamped to `[0, 1]`; passing `1.0`
    /// pins jitter to the ceiling.
    #[must_use]
    pub fn delay_with_fraction(
        &self,
        attempt: u32,
        explicit_wait: Option<Duration>,
        fraction: f64,
    ) -> Duration {
        if let Some(wait) = explicit_wait {
            return wait;
        }
        self.ceiling(attempt).mul_f64(fraction.clamp(0.0, 1.0))
    }

    fn ceiling(&self, attempt: u32) -> Duration {
        self.base
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.cap)
    }
}

/// Classification of a transient failure, produced by the caller's classifier.
#[derive(Debug, Clone, Default)]
pub struct RetryHint {
    /// Server-supplied wait, honored verbatim over computed backoff.
    pub retry_after: Option<Duration>,
    /// Free-form context attached to retry telemetry.
    pub context: Vec<(String, String)>,
}

/// Telemetry record emitted before each retry sleep.
#[derive(Debug, Clone)]
pub struct RetryEvent {
    /// 1-based index of the attempt that just failed.
    pub attempt: u32,
    /// The delay about to be slept.
    pub delay: Duration,
    /// Explicit server wait hint, if one was present.
    pub retry_after: Option<Duration>,
    /// Context from the classifier (url, status code, ...).
    pub context: Vec<(String, String)>,
}

/// Callback invoked with a [`RetryEvent`] between attempts.
pub type RetryCallback = Box<dyn Fn(RetryEvent) + Send + Sync>;

/// Sleep dependency, injectable so unit tests never block on the wall clock.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Executes a fallible operation with bounded retries.
#[derive(Debug, Clone, Copy)]
pub struct RetryRunner {
    /// Total attempt budget (including the first attempt).
    pub max_attempts: u32,
    /// Backoff policy applied between attempts.
    pub backoff: BackoffPolicy,
}

impl Default for RetryRunner {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl RetryRunner {
    #[must_use]
    pub fn new(max_attempts: u32, backoff: BackoffPolicy) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Run `operation` up to `max_attempts` times.
    ///
    /// `classify` returns `Some(hint)` for transient failures and `None` for
    /// fatal ones. Fatal failures and the final attempt's transient failure
    /// propagate to the caller unchanged; `on_retry` fires once per sleep, so
    /// an exhausted budget produces exactly `max_attempts - 1` events.
    pub async fn run<T, E, F, Fut, C>(
        &self,
        mut operation: F,
        classify: C,
        sleeper: &dyn Sleeper,
        on_retry: Option<&RetryCallback>,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> Option<RetryHint>,
    {
        let budget = self.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    let Some(hint) = classify(&err) else {
                        return Err(err);
                    };
                    if attempt >= budget {
                        return Err(err);
                    }

                    let delay = self.backoff.delay(attempt - 1, hint.retry_after);
                    if let Some(cb) = on_retry {
                        cb(RetryEvent {
                            attempt,
                            delay,
                            retry_after: hint.retry_after,
                            context: hint.context,
                        });
                    }
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transient failure, backing off"
                    );
                    sleeper.sleep(delay).await;
                }
            }
        }
    }
}
