//! Minimum spacing between calls to a rate-limited service.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Grants permits no closer together than `min_interval`.
///
/// The check-wait-record sequence runs while holding an async mutex, so
/// concurrent callers are granted one at a time, in lock order, and every
/// pair of consecutive grants is at least `min_interval` apart. Waiting is a
/// timer sleep, never a spin.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_grant: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_grant: Mutex::new(None),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the next call may proceed; returns the grant time.
    ///
    /// Dropping the returned future while it waits gives up the turn without
    /// recording a grant.
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last_grant.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                debug!(wait_ms = remaining.as_millis() as u64, "Rate limiter delaying call");
                sleep(remaining).await;
            }
        }
        let now = Instant::now();
        *last = Some(now);
        now
    }
}
