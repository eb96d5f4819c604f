//! Progress tracking for a running batch.
//!
//! Counts terminal outcomes as they arrive and decides when a progress line
//! is due. Formatting is kept here so the aggregator only has to log it.

use std::time::Duration;
use tokio::time::Instant;

use crate::FetchOutcome;

const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(30);

/// Progress state for one batch
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Identifiers submitted
    pub total: usize,
    /// Outcomes received so far
    pub completed: usize,
    /// Outcomes carrying a listing
    pub succeeded: usize,
    /// Outcomes carrying the sentinel price
    pub failed: usize,
    /// Batch start
    pub start_time: Instant,
    last_update: Instant,
    update_interval: Duration,
}

impl BatchProgress {
    /// Create a tracker for `total` identifiers
    pub fn new(total: usize) -> Self {
        let now = Instant::now();
        Self {
            total,
            completed: 0,
            succeeded: 0,
            failed: 0,
            start_time: now,
            last_update: now,
            update_interval: DEFAULT_UPDATE_INTERVAL,
        }
    }

    /// Override the minimum interval between progress lines
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Count one outcome
    ///
    /// Returns `true` when a progress line is due: on the last outcome, or
    /// when the update interval has passed since the previous line.
    pub fn record(&mut self, outcome: &FetchOutcome) -> bool {
        self.completed += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }

        let now = Instant::now();
        if self.is_complete() || now.duration_since(self.last_update) >= self.update_interval {
            self.last_update = now;
            return true;
        }
        false
    }

    /// Whether every identifier has reported
    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }

    /// Completion percentage (0-100)
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.completed as f64 / self.total as f64) * 100.0
    }

    /// Human-readable progress line
    pub fn format(&self) -> String {
        format!(
            "Progress: {}/{} ({:.1}%) - {} ok, {} failed, {}s elapsed",
            self.completed,
            self.total,
            self.percentage(),
            self.succeeded,
            self.failed,
            self.start_time.elapsed().as_secs()
        )
    }
}
