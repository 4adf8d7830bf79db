use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Suspension point inserted between provider calls
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Wait until the next call is allowed
    async fn wait(&self);
}

/// Fixed pause before each call after the first
#[derive(Debug, Clone)]
pub struct FixedDelayLimiter {
    delay: Duration,
}

impl FixedDelayLimiter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl RateLimiter for FixedDelayLimiter {
    async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }
        debug!(delay_ms = self.delay.as_millis() as u64, "Rate limit pause");
        sleep(self.delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_sleeps_for_configured_duration() {
        let limiter = FixedDelayLimiter::new(Duration::from_millis(2000));
        let start = tokio::time::Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_zero_delay_returns_immediately() {
        let limiter = FixedDelayLimiter::new(Duration::ZERO);
        let start = std::time::Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
