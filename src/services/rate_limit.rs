//! Global pacing of outbound provider calls.

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Duration, Instant};

/// Enforces a minimum gap between dispatches, across all concurrent
/// callers. The fair mutex queues waiters in arrival order, so callers are
/// served FIFO and simply await their slot.
pub struct RateLimiter {
    next_slot: Mutex<Instant>,
    min_gap: Duration,
}

impl RateLimiter {
    pub fn new(min_gap: Duration) -> Self {
        Self {
            next_slot: Mutex::new(Instant::now()),
            min_gap,
        }
    }

    /// Waits until this caller may dispatch, then reserves the next slot.
    pub async fn acquire(&self) {
        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();
        if *next_slot > now {
            sleep_until(*next_slot).await;
        }
        *next_slot = Instant::now() + self.min_gap;
    }
}
