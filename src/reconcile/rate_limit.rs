//! Token bucket pacing the reconciliation loop.

use std::time::Duration;

use tokio::time::{self, Instant};

use crate::config::ReconcileConfig;

/// A token bucket whose `acquire` waits instead of rejecting.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_rate: f64,
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    /// Bucket refilling at `refill_rate` tokens per second, starting full.
    pub fn new(refill_rate: f64, capacity: u32) -> Self {
        let capacity = f64::from(capacity.max(1));
        Self {
            capacity,
            refill_rate,
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    pub fn from_config(config: &ReconcileConfig) -> Self {
        Self::new(config.ticks_per_second, config.burst)
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_update = now;
    }

    /// Take a token if one is available right now.
    pub fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Take a token, sleeping until one has accrued.
    pub async fn acquire(&mut self) {
        loop {
            if self.try_acquire() {
                return;
            }
            let missing = 1.0 - self.tokens;
            let wait = Duration::from_secs_f64(missing / self.refill_rate);
            time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_throttle() {
        let mut bucket = TokenBucket::new(0.1, 2);
        assert!(bucket.try_acquire());
        assert!(bucket.try_acquire());
        assert!(!bucket.try_acquire());

        time::advance(Duration::from_secs(10)).await;
        assert!(bucket.try_acquire());
        assert!(!bucket.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_refill() {
        let mut bucket = TokenBucket::new(0.1, 1);
        let start = Instant::now();

        bucket.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        bucket.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(10));
        assert!(start.elapsed() < Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokens_do_not_exceed_capacity() {
        let mut bucket = TokenBucket::new(1.0, 1);
        bucket.acquire().await;
        time::advance(Duration::from_secs(60)).await;
        assert!(bucket.try_acquire());
        assert!(!bucket.try_acquire());
    }
}
