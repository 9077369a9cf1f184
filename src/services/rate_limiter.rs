//! Fixed-interval request pacing
//!
//! Callers pass through `wait` at most once per configured interval. Kept as
//! its own primitive so the rate contract is testable apart from any client.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Fixed-interval gate in front of outbound requests
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait if necessary to comply with the configured interval
    ///
    /// The first acquisition passes immediately.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
