//! Cohort-based launch pacing
//!
//! The search API enforces an undocumented per-minute quota. Instead of a
//! token bucket, the governor lets `cohort_size` fetch chains launch and then
//! holds further launches for a randomized cooldown slightly over a minute.
//! Only launches are paced; chains already in flight (including their retry
//! backoffs) are unaffected.

use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

use super::config::GovernorConfig;
use crate::metrics;
use crate::shutdown::ShutdownCoordinator;

/// Paces fetch-chain launches in cohorts
#[derive(Debug, Clone)]
pub struct RateGovernor {
    config: GovernorConfig,
    total: usize,
    launched: usize,
}

impl RateGovernor {
    /// Create a governor for a batch of `total` launches
    pub fn new(config: GovernorConfig, total: usize) -> Self {
        Self {
            config,
            total,
            launched: 0,
        }
    }

    /// Number of launches recorded so far
    pub fn launched(&self) -> usize {
        self.launched
    }

    /// Record one launch and decide whether a cooldown is due
    ///
    /// Returns the pause to take before the next launch. No pause follows
    /// the final launch since no further cohort is waiting.
    pub fn record_launch(&mut self) -> Option<Duration> {
        self.launched += 1;

        let cohort_size = self.config.cohort_size;
        if cohort_size == 0 || self.launched >= self.total {
            return None;
        }
        if self.launched % cohort_size == 0 {
            Some(self.config.draw_cooldown())
        } else {
            None
        }
    }

    /// Record one launch and sleep through the cooldown if one is due
    ///
    /// Returns the time actually paused. A shutdown request cuts the pause
    /// short, in which case the returned duration is below the drawn one.
    pub async fn after_launch(&mut self, shutdown: &ShutdownCoordinator) -> Option<Duration> {
        let cooldown = self.record_launch()?;

        info!(
            launched = self.launched,
            total = self.total,
            cooldown_ms = cooldown.as_millis() as u64,
            "Launch cohort complete, cooling down"
        );
        let started = Instant::now();
        let paused = if shutdown.sleep_unless_shutdown(cooldown).await {
            cooldown
        } else {
            let paused = started.elapsed();
            info!(
                paused_ms = paused.as_millis() as u64,
                cooldown_ms = cooldown.as_millis() as u64,
                "Cooldown interrupted by shutdown"
            );
            paused
        };
        metrics::record_cooldown(paused);

        Some(paused)
    }
}
