//! Batch configuration and jitter draws

use rand::Rng;
use std::time::Duration;

/// Additional attempts allowed after the first request.
/// The upstream throttles hard, so the budget is generous.
pub const MAX_RETRIES: u32 = 10;

/// Lower bound of the randomized retry backoff
pub const RETRY_BACKOFF_MIN: Duration = Duration::from_secs(4);

/// Upper bound of the randomized retry backoff
pub const RETRY_BACKOFF_MAX: Duration = Duration::from_secs(6);

/// Launches allowed before a cooldown pause
pub const LAUNCH_COHORT_SIZE: usize = 100;

/// Lower bound of the cohort cooldown.
/// Slightly over a minute so the upstream per-minute quota has refilled.
pub const COHORT_COOLDOWN_MIN: Duration = Duration::from_secs(65);

/// Upper bound of the cohort cooldown
pub const COHORT_COOLDOWN_MAX: Duration = Duration::from_secs(70);

/// Draw a duration uniformly from `[min, max]` at millisecond resolution
///
/// Returns `min` when the range is empty or inverted.
pub fn jitter(min: Duration, max: Duration) -> Duration {
    let min_ms = min.as_millis() as u64;
    let max_ms = max.as_millis() as u64;
    if max_ms <= min_ms {
        return min;
    }
    Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
}

/// Per-identifier retry parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Attempts allowed after the first one
    pub max_retries: u32,
    /// Minimum backoff between attempts
    pub backoff_min: Duration,
    /// Maximum backoff between attempts
    pub backoff_max: Duration,
}

impl RetryConfig {
    /// Override the retry budget
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Override the backoff range
    pub fn with_backoff(mut self, min: Duration, max: Duration) -> Self {
        self.backoff_min = min;
        self.backoff_max = max;
        self
    }

    /// Draw the next backoff delay
    pub fn draw_backoff(&self) -> Duration {
        jitter(self.backoff_min, self.backoff_max)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            backoff_min: RETRY_BACKOFF_MIN,
            backoff_max: RETRY_BACKOFF_MAX,
        }
    }
}

/// Launch pacing parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernorConfig {
    /// Launches per cohort; zero disables pacing
    pub cohort_size: usize,
    /// Minimum pause between cohorts
    pub cooldown_min: Duration,
    /// Maximum pause between cohorts
    pub cooldown_max: Duration,
}

impl GovernorConfig {
    /// Override the cohort size
    pub fn with_cohort_size(mut self, cohort_size: usize) -> Self {
        self.cohort_size = cohort_size;
        self
    }

    /// Override the cooldown range
    pub fn with_cooldown(mut self, min: Duration, max: Duration) -> Self {
        self.cooldown_min = min;
        self.cooldown_max = max;
        self
    }

    /// Draw the next cooldown pause
    pub fn draw_cooldown(&self) -> Duration {
        jitter(self.cooldown_min, self.cooldown_max)
    }
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            cohort_size: LAUNCH_COHORT_SIZE,
            cooldown_min: COHORT_COOLDOWN_MIN,
            cooldown_max: COHORT_COOLDOWN_MAX,
        }
    }
}

/// Full batch configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchConfig {
    /// Retry policy parameters
    pub retry: RetryConfig,
    /// Rate governor parameters
    pub governor: GovernorConfig,
    /// Wall-time limit after which remaining work is cancelled
    pub deadline: Option<Duration>,
}

impl BatchConfig {
    /// Override the launch cohort size
    pub fn with_cohort_size(mut self, cohort_size: usize) -> Self {
        self.governor.cohort_size = cohort_size;
        self
    }

    /// Override the retry budget
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    /// Set an overall deadline
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}
