use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Enforces a minimum spacing between outbound search requests.
pub struct RateLimiter {
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(requests_per_second: f64) -> Self {
        let min_interval = if requests_per_second > 0.0 && requests_per_second.is_finite() {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            tracing::warn!(
                "Rate limiter configured with {requests_per_second} req/s, requests are not spaced"
            );
            Duration::ZERO
        };
        Self {
            min_interval,
            next_slot: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Reserve the next request slot and sleep until it opens.
    pub async fn wait(&self) {
        let delay = {
            let mut next = self.next_slot.lock().unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            let slot = next.map_or(now, |at| at.max(now));
            *next = Some(slot + self.min_interval);
            slot.saturating_duration_since(now)
        };

        if !delay.is_zero() {
            tracing::trace!(delay_ms = delay.as_millis(), "Waiting for rate limit slot");
            tokio::time::sleep(delay).await;
        }
    }
}
