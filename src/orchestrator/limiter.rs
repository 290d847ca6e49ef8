//! Single-lane dispatch rate limiter.
//!
//! The upstream quota model wants at most one in-flight call system-wide
//! and a hard floor on cadence. Both fall out of one fair async mutex:
//! waiters queue FIFO on the lock, the holder is the single in-flight
//! dispatch, and the interval is measured from the moment the previous
//! holder released.

use std::time::{Duration, Instant};

use tokio::sync::{Mutex, MutexGuard};

/// Minimum interval between dispatch completions and the next dispatch.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// FIFO rate limiter enforcing a minimum inter-dispatch interval.
pub struct RateLimiter {
    min_interval: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: Mutex::new(None),
        }
    }

    /// Wait for our turn in the queue, then for the interval to elapse.
    ///
    /// The returned permit must be held for the duration of the dispatch;
    /// dropping it stamps the completion time that the next acquirer
    /// measures its wait from — on success and failure alike, so a failed
    /// dispatch cannot starve the queue.
    pub async fn acquire(&self) -> DispatchPermit<'_> {
        // tokio's Mutex queues waiters fairly, which gives us FIFO order.
        let guard = self.last_dispatch.lock().await;
        if let Some(last) = *guard {
            let since = last.elapsed();
            if since < self.min_interval {
                tokio::time::sleep(self.min_interval - since).await;
            }
        }
        DispatchPermit { guard }
    }
}

/// Exclusive right to perform one dispatch.
pub struct DispatchPermit<'a> {
    guard: MutexGuard<'a, Option<Instant>>,
}

impl Drop for DispatchPermit<'_> {
    fn drop(&mut self) {
        *self.guard = Some(Instant::now());
    }
}
