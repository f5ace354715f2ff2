// Minimum-interval throttle for classifier calls.
//
// The classifier endpoint bills per request, so we keep at least
// `min_interval` between dispatches. The policy is deliberately coarse:
// when a call arrives too soon after the previous one, the caller sleeps a
// full interval rather than just the remaining time. Waiters queue on the
// limiter's lock, so concurrent callers dispatch one interval apart instead
// of all at once. The last-dispatch timestamp behaves like a short-lived
// cache entry and is forgotten after `expiry`.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Default spacing between classifier calls.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(2);

/// How long a recorded dispatch is remembered.
pub const DEFAULT_RECORD_EXPIRY: Duration = Duration::from_secs(10);

/// What `acquire` had to do before letting the caller through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// No recent dispatch (or it was long enough ago).
    Immediate,
    /// The caller slept for the given duration first.
    Waited(Duration),
}

/// A shared throttle. Clones share the same timestamp.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
}

struct RateLimiterInner {
    /// Minimum time between requests
    interval: Duration,
    /// Recorded dispatches older than this count as "none"
    expiry: Duration,
    /// When the last request was let through
    last_request: Option<Instant>,
}

impl RateLimiterInner {
    /// The last dispatch time, unless the record has expired.
    fn live_record(&self, now: Instant) -> Option<Instant> {
        self.last_request
            .filter(|last| now.saturating_duration_since(*last) < self.expiry)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL, DEFAULT_RECORD_EXPIRY)
    }
}

impl RateLimiter {
    pub fn new(interval: Duration, expiry: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RateLimiterInner {
                interval,
                expiry,
                last_request: None,
            })),
        }
    }

    /// Wait until a request is allowed, then return what happened.
    ///
    /// The lock is held across the sleep so waiters are released one at a
    /// time, and the post-wait instant becomes the new dispatch time.
    pub async fn acquire(&self) -> Acquire {
        let mut inner = self.inner.lock().await;
        let now = Instant::now();

        let wait = match inner.live_record(now) {
            Some(last) if now.duration_since(last) < inner.interval => Some(inner.interval),
            _ => None,
        };

        let outcome = match wait {
            Some(duration) => {
                tokio::time::sleep(duration).await;
                Acquire::Waited(duration)
            }
            None => Acquire::Immediate,
        };

        inner.last_request = Some(Instant::now());
        outcome
    }

    /// Time of the last recorded dispatch, if it hasn't expired.
    pub async fn last_request(&self) -> Option<Instant> {
        let inner = self.inner.lock().await;
        inner.live_record(Instant::now())
    }
}
