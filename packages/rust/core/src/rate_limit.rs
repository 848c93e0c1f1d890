//! Pacing between generation calls.
//!
//! The orchestrator pauses after every stage. The pause is a fixed wall-clock
//! delay, unconditional and independent of how long the previous call took
//! or how many tokens it used.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Default pause between stages.
pub const DEFAULT_STAGE_DELAY: Duration = Duration::from_secs(15);

/// A pacing policy applied between stages.
pub trait RateLimiter: Send + Sync {
    /// Length of each pause; reported to the user before pausing.
    fn delay(&self) -> Duration;

    /// Wait before the next stage.
    fn pause(&self) -> impl Future<Output = ()> + Send;
}

/// Sleeps for the same duration every time.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(DEFAULT_STAGE_DELAY)
    }
}

impl RateLimiter for FixedDelay {
    fn delay(&self) -> Duration {
        self.delay
    }

    async fn pause(&self) {
        debug!(secs = self.delay.as_secs_f64(), "rate limit pause");
        tokio::time::sleep(self.delay).await;
    }
}

/// Never waits. For tests and `--delay 0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl RateLimiter for NoDelay {
    fn delay(&self) -> Duration {
        Duration::ZERO
    }

    async fn pause(&self) {}
}
