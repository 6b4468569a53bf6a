//! Request pacing for the TMDB API

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::time::Duration;
use tracing::trace;

/// Global rate limiter shared by every request of a client
pub struct RequestRateLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl RequestRateLimiter {
    /// Create a limiter allowing `requests_per_second` (may be fractional)
    pub fn new(requests_per_second: f64) -> Self {
        let quota = Duration::try_from_secs_f64(1.0 / requests_per_second)
            .ok()
            .and_then(Quota::with_period)
            .unwrap_or_else(|| Quota::per_second(nonzero!(1u32)));

        Self {
            limiter: RateLimiter::direct(quota),
        }
    }

    /// Wait until a request is allowed
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
        trace!("Rate limiter released request");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_fast_limiter_does_not_stall() {
        let limiter = RequestRateLimiter::new(1000.0);
        for _ in 0..10 {
            limiter.wait().await;
        }
    }

    #[tokio::test]
    async fn test_slow_limiter_spaces_requests() {
        let limiter = RequestRateLimiter::new(10.0); // 100ms between requests

        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        limiter.wait().await;

        assert!(start.elapsed() >= Duration::from_millis(180));
    }

    #[test]
    fn test_invalid_rate_falls_back() {
        let _ = RequestRateLimiter::new(0.0);
        let _ = RequestRateLimiter::new(f64::NAN);
    }
}
