//! Client-side request spacing for the rate-limited SportsData API

use rand::Rng;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

use crate::constants::rate_limit::INTERVAL_RANDOMNESS;

/// Spaces requests so no more than `per_second` leave per second on average.
/// Each slot is pushed back by a random share of the interval so bursts from
/// several processes do not line up.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    randomness: f64,
    next_slot: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(per_second: u32) -> Self {
        Self::with_randomness(per_second, INTERVAL_RANDOMNESS)
    }

    pub fn with_randomness(per_second: u32, randomness: f64) -> Self {
        let per_second = per_second.max(1);
        Self {
            interval: Duration::from_secs(1) / per_second,
            randomness: randomness.clamp(0.0, 1.0),
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Base spacing between two requests
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until the next request slot is free and claims it.
    pub async fn acquire(&self) {
        let wait = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let start = (*next_slot).max(now);
            *next_slot = start + self.spacing();
            start - now
        };

        if !wait.is_zero() {
            trace!("Rate limiter delaying request by {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }

    fn spacing(&self) -> Duration {
        if self.randomness == 0.0 {
            return self.interval;
        }
        let jitter = rand::rng().random_range(0.0..=self.randomness);
        self.interval.mul_f64(1.0 + jitter)
    }
}
