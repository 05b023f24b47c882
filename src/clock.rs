//! Time source used by the rate limit wait and confirmation polling

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Wall clock plus sleeping, injectable so tests never really wait.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}

/// The real clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
pub use manual::ManualClock;
