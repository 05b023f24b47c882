//! Core API quota tracking for the source and target tokens
//!
//! Quota is read from `/rate_limit` on both sides. A failed read is reported
//! as an unknown snapshot and never fails the run: unknown quota neither
//! passes nor fails a health check and never causes a wait.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;

use crate::client::api::RateLimitApi;
use crate::clock::Clock;
use crate::config::Side;

/// Minimum remaining quota for a checkpoint to count as healthy.
pub const HEALTHY_THRESHOLD: u32 = 30;

/// Remaining quota below which a checkpoint logs a warning.
pub const LOW_QUOTA_WARNING: u32 = 50;

/// Remaining quota below which the run pauses until the window resets.
pub const CRITICAL_THRESHOLD: u32 = 100;

/// Slack added after the latest reset before resuming.
pub const RESET_BUFFER: Duration = Duration::from_secs(2);

/// Longest single sleep while waiting for a reset.
pub const MAX_SLEEP_STEP: Duration = Duration::from_secs(10);

/// Core quota of one token at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitSnapshot {
    pub remaining: u32,
    pub limit: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitSnapshot {
    pub fn is_below(&self, threshold: u32) -> bool {
        self.remaining < threshold
    }

    /// Time until the window resets, zero if it already has.
    pub fn reset_in(&self, now: DateTime<Utc>) -> Duration {
        (self.reset_at - now).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Snapshots of both sides. `None` means the quota could not be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuotaStatus {
    pub source: Option<RateLimitSnapshot>,
    pub target: Option<RateLimitSnapshot>,
}

impl QuotaStatus {
    pub fn sides(&self) -> [(Side, Option<&RateLimitSnapshot>); 2] {
        [
            (Side::Source, self.source.as_ref()),
            (Side::Target, self.target.as_ref()),
        ]
    }

    /// True unless a known snapshot is below `threshold`.
    pub fn is_healthy(&self, threshold: u32) -> bool {
        self.sides()
            .iter()
            .filter_map(|(_, snapshot)| *snapshot)
            .all(|snapshot| !snapshot.is_below(threshold))
    }
}

/// How long to pause so every critical quota has reset.
///
/// `None` when no known snapshot is below `threshold`. Otherwise the time to
/// the latest reset among critical snapshots plus [`RESET_BUFFER`], or zero
/// when that moment has already passed.
pub fn critical_wait(status: &QuotaStatus, threshold: u32, now: DateTime<Utc>) -> Option<Duration> {
    let latest_reset = status
        .sides()
        .iter()
        .filter_map(|(_, snapshot)| *snapshot)
        .filter(|snapshot| snapshot.is_below(threshold))
        .map(|snapshot| snapshot.reset_at)
        .max()?;

    let resume_at = latest_reset + chrono::Duration::from_std(RESET_BUFFER).unwrap_or_default();
    Some((resume_at - now).to_std().unwrap_or(Duration::ZERO))
}

/// Checkpoint warning for a quota below [`LOW_QUOTA_WARNING`].
fn low_quota_warning(
    checkpoint: &str,
    side: Side,
    snapshot: &RateLimitSnapshot,
    now: DateTime<Utc>,
) -> Option<String> {
    snapshot.is_below(LOW_QUOTA_WARNING).then(|| {
        format!(
            "[{}] {} API quota is low: {} requests remaining (resets in ~{}s)",
            checkpoint,
            side,
            snapshot.remaining,
            snapshot.reset_in(now).as_secs()
        )
    })
}

/// Result of a [`RateLimitMonitor::wait_if_critical`] pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaWait {
    pub waited: Duration,
    pub refreshed: QuotaStatus,
}

/// Reads and reacts to the quota of the source and target tokens.
pub struct RateLimitMonitor<S: ?Sized, C: ?Sized> {
    source: Arc<S>,
    target: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> RateLimitMonitor<S, C>
where
    S: RateLimitApi + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(source: Arc<S>, target: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            source,
            target,
            clock,
        }
    }

    async fn snapshot(side: Side, service: &S) -> Option<RateLimitSnapshot> {
        match service.rate_limit().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!("Could not read {} rate limit: {}", side, e);
                None
            }
        }
    }

    /// Read both quotas concurrently.
    pub async fn status(&self) -> QuotaStatus {
        let (source, target) = futures::join!(
            Self::snapshot(Side::Source, &self.source),
            Self::snapshot(Side::Target, &self.target)
        );
        QuotaStatus { source, target }
    }

    /// True unless a known quota is below `threshold`.
    pub async fn is_healthy(&self, threshold: u32) -> bool {
        self.status().await.is_healthy(threshold)
    }

    /// Log both quotas at the start of a run.
    pub async fn log_status(&self) -> QuotaStatus {
        let status = self.status().await;
        for (side, snapshot) in status.sides() {
            match snapshot {
                Some(s) => info!(
                    "{} API quota: {}/{} remaining (resets {})",
                    side,
                    s.remaining,
                    s.limit,
                    s.reset_at.format("%H:%M:%S UTC")
                ),
                None => info!("{} API quota: unknown", side),
            }
        }
        status
    }

    /// Named step boundary: log quota, warn when low, report health.
    pub async fn checkpoint(&self, name: &str) -> bool {
        let status = self.status().await;
        for (side, snapshot) in status.sides() {
            let Some(s) = snapshot else {
                continue;
            };
            debug!(
                "[{}] {} quota: {}/{} remaining",
                name, side, s.remaining, s.limit
            );
            if let Some(message) = low_quota_warning(name, side, s, self.clock.now()) {
                warn!("{}", message);
            }
        }
        status.is_healthy(HEALTHY_THRESHOLD)
    }

    /// Pause until every quota below `threshold` has reset.
    ///
    /// Returns `None` without sleeping when no known quota is below
    /// `threshold`. Sleeps in steps of at most [`MAX_SLEEP_STEP`], then reads
    /// the quotas again and logs them.
    pub async fn wait_if_critical(&self, threshold: u32) -> Option<QuotaWait> {
        let status = self.status().await;
        let wait = critical_wait(&status, threshold, self.clock.now())?;

        for (side, snapshot) in status.sides() {
            if let Some(s) = snapshot.filter(|s| s.is_below(threshold)) {
                warn!(
                    "{} API quota critical: {} requests remaining, resets at {}",
                    side,
                    s.remaining,
                    s.reset_at.format("%H:%M:%S UTC")
                );
            }
        }
        info!("Waiting {}s for API quota to reset", wait.as_secs());

        let mut left = wait;
        while !left.is_zero() {
            let step = left.min(MAX_SLEEP_STEP);
            self.clock.sleep(step).await;
            left -= step;
            if !left.is_zero() {
                debug!("{}s until quota reset", left.as_secs());
            }
        }

        let refreshed = self.status().await;
        for (side, snapshot) in refreshed.sides() {
            if let Some(s) = snapshot {
                info!("{} API quota after reset: {}/{}", side, s.remaining, s.limit);
            }
        }

        Some(QuotaWait {
            waited: wait,
            refreshed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockGitHubClient;
    use crate::clock::ManualClock;
    use crate::error::ApiError;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn snapshot(remaining: u32, reset_in_secs: i64) -> RateLimitSnapshot {
        RateLimitSnapshot {
            remaining,
            limit: 5000,
            reset_at: now() + chrono::Duration::seconds(reset_in_secs),
        }
    }

    fn monitor(
        source: MockGitHubClient,
        target: MockGitHubClient,
    ) -> (
        RateLimitMonitor<MockGitHubClient, ManualClock>,
        Arc<ManualClock>,
    ) {
        let clock = Arc::new(ManualClock::new(now()));
        let monitor = RateLimitMonitor::new(Arc::new(source), Arc::new(target), clock.clone());
        (monitor, clock)
    }

    #[test]
    fn test_critical_wait_uses_latest_critical_reset() {
        let status = QuotaStatus {
            source: Some(snapshot(50, 30)),
            target: Some(snapshot(10, 60)),
        };

        let wait = critical_wait(&status, CRITICAL_THRESHOLD, now()).unwrap();
        assert_eq!(wait, Duration::from_secs(62));
    }

    #[test]
    fn test_critical_wait_ignores_healthy_side() {
        let status = QuotaStatus {
            source: Some(snapshot(50, 30)),
            target: Some(snapshot(4000, 3000)),
        };

        let wait = critical_wait(&status, CRITICAL_THRESHOLD, now()).unwrap();
        assert_eq!(wait, Duration::from_secs(32));
    }

    #[test]
    fn test_critical_wait_none_when_healthy_or_unknown() {
        let healthy = QuotaStatus {
            source: Some(snapshot(500, 30)),
            target: None,
        };
        assert!(critical_wait(&healthy, CRITICAL_THRESHOLD, now()).is_none());
        assert!(critical_wait(&QuotaStatus::default(), CRITICAL_THRESHOLD, now()).is_none());
    }

    #[test]
    fn test_critical_wait_clamps_past_reset() {
        let status = QuotaStatus {
            source: Some(snapshot(0, -60)),
            target: None,
        };
        assert_eq!(
            critical_wait(&status, CRITICAL_THRESHOLD, now()),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_is_healthy_treats_unknown_as_pass() {
        let status = QuotaStatus {
            source: None,
            target: Some(snapshot(31, 10)),
        };
        assert!(status.is_healthy(HEALTHY_THRESHOLD));

        let status = QuotaStatus {
            source: Some(snapshot(29, 10)),
            target: None,
        };
        assert!(!status.is_healthy(HEALTHY_THRESHOLD));
    }

    #[test]
    fn test_snapshot_reset_in() {
        assert_eq!(snapshot(1, 45).reset_in(now()), Duration::from_secs(45));
        assert_eq!(snapshot(1, -5).reset_in(now()), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_wait_if_critical_sleeps_in_steps() {
        let source = MockGitHubClient::new().with_rate_limits(vec![snapshot(50, 30), snapshot(5000, 3600)]);
        let target = MockGitHubClient::new().with_rate_limits(vec![snapshot(10, 60), snapshot(5000, 3600)]);
        let (monitor, clock) = monitor(source, target);

        let wait = monitor.wait_if_critical(CRITICAL_THRESHOLD).await.unwrap();

        assert_eq!(wait.waited, Duration::from_secs(62));
        assert_eq!(clock.total_slept(), Duration::from_secs(62));
        assert!(clock.sleeps().iter().all(|s| *s <= MAX_SLEEP_STEP));
        assert_eq!(clock.sleeps().len(), 7);
        assert_eq!(wait.refreshed.source.map(|s| s.remaining), Some(5000));
        assert_eq!(wait.refreshed.target.map(|s| s.remaining), Some(5000));
    }

    #[tokio::test]
    async fn test_wait_if_critical_no_wait_when_healthy() {
        let source = MockGitHubClient::new().with_rate_limits(vec![snapshot(4000, 30)]);
        let target = MockGitHubClient::new().with_rate_limits(vec![snapshot(100, 60)]);
        let (monitor, clock) = monitor(source, target);

        assert!(monitor.wait_if_critical(CRITICAL_THRESHOLD).await.is_none());
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_quota_never_waits() {
        let source = MockGitHubClient::new()
            .failing("rate_limit", ApiError::ServerError("unavailable".into()));
        let target = MockGitHubClient::new()
            .failing("rate_limit", ApiError::Network("timeout".into()));
        let (monitor, clock) = monitor(source, target);

        let status = monitor.status().await;
        assert_eq!(status, QuotaStatus::default());
        assert!(monitor.is_healthy(HEALTHY_THRESHOLD).await);
        assert!(monitor.wait_if_critical(CRITICAL_THRESHOLD).await.is_none());
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_checkpoint_reports_health() {
        let source = MockGitHubClient::new().with_rate_limits(vec![snapshot(20, 30)]);
        let target = MockGitHubClient::new().with_rate_limits(vec![snapshot(5000, 30)]);
        let (monitor, _) = monitor(source, target);

        assert!(!monitor.checkpoint("Discover inventory").await);
    }

    #[tokio::test]
    async fn test_checkpoint_low_quota_still_healthy() {
        let source = MockGitHubClient::new().with_rate_limits(vec![snapshot(40, 30)]);
        let target = MockGitHubClient::new().with_rate_limits(vec![snapshot(5000, 30)]);
        let (monitor, clock) = monitor(source, target);

        assert!(monitor.checkpoint("Prepare branch").await);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn test_low_quota_warning_includes_reset_time() {
        let message =
            low_quota_warning("Prepare branch", Side::Source, &snapshot(40, 95), now()).unwrap();

        assert!(message.contains("[Prepare branch]"));
        assert!(message.contains("source"));
        assert!(message.contains("40 requests remaining"));
        assert!(message.contains("resets in ~95s"));
    }

    #[test]
    fn test_low_quota_warning_silent_at_threshold() {
        let at_threshold = snapshot(LOW_QUOTA_WARNING, 95);
        assert!(low_quota_warning("Done", Side::Target, &at_threshold, now()).is_none());

        let past_reset = snapshot(10, -30);
        let message = low_quota_warning("Done", Side::Target, &past_reset, now()).unwrap();
        assert!(message.contains("resets in ~0s"));
    }
}
