//! Batch observability metrics
//!
//! Counters and histograms for search requests, retries, cohort cooldowns
//! and per-identifier outcomes.
//!
//! ## Architecture
//!
//! - Uses `metrics` crate for low-overhead metric collection
//! - Prometheus exporter is installed only when a scrape address is given
//! - Without an installed recorder every call below is a no-op

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::downloader::ResultSet;
use crate::fetcher::SearchResponse;
use crate::FetchOutcome;

static METRICS_INITIALIZED: OnceCell<SocketAddr> = OnceCell::new();

/// Metrics setup errors
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Exporter could not be installed
    #[error("failed to install Prometheus exporter: {0}")]
    InstallError(String),
}

/// Initialize metrics system with Prometheus exporter
///
/// Must be called from within a tokio runtime. Idempotent: later calls
/// are ignored.
///
/// # Arguments
/// * `addr` - Socket address to bind the scrape endpoint (e.g., "0.0.0.0:9090")
pub fn init_metrics(addr: SocketAddr) -> Result<(), MetricsError> {
    if METRICS_INITIALIZED.get().is_some() {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MetricsError::InstallError(e.to_string()))?;

    describe_metrics();

    let _ = METRICS_INITIALIZED.set(addr);
    info!("Metrics system initialized on {}", addr);
    Ok(())
}

/// Register units and help text for every metric this crate records
fn describe_metrics() {
    describe_counter!(
        "search_requests_total",
        Unit::Count,
        "Total number of search requests by classified status"
    );
    describe_counter!("search_retries_total", Unit::Count, "Total number of retry attempts");
    describe_histogram!(
        "search_backoff_seconds",
        Unit::Seconds,
        "Randomized retry backoff durations"
    );
    describe_counter!(
        "batch_outcomes_total",
        Unit::Count,
        "Per-identifier outcomes by result"
    );
    describe_counter!(
        "batch_cooldowns_total",
        Unit::Count,
        "Cohort cooldown pauses taken by the rate governor"
    );
    describe_histogram!(
        "batch_cooldown_seconds",
        Unit::Seconds,
        "Time actually paused per cohort cooldown"
    );
    describe_histogram!(
        "batch_duration_seconds",
        Unit::Seconds,
        "Wall time of complete batches"
    );
}

/// Whether an exporter has been installed
pub fn is_initialized() -> bool {
    METRICS_INITIALIZED.get().is_some()
}

/// Record one classified search response
pub fn record_search_response(response: &SearchResponse) {
    counter!("search_requests_total", "status" => response.status_label()).increment(1);
}

/// Record a retry backoff
pub fn record_retry_backoff(duration: Duration, attempt: u32) {
    counter!("search_retries_total").increment(1);
    histogram!("search_backoff_seconds").record(duration.as_secs_f64());

    debug!(
        attempt = attempt,
        backoff_ms = duration.as_millis() as u64,
        "Retry backoff recorded"
    );
}

/// Record a cohort cooldown
pub fn record_cooldown(duration: Duration) {
    counter!("batch_cooldowns_total").increment(1);
    histogram!("batch_cooldown_seconds").record(duration.as_secs_f64());
}

/// Record one identifier's terminal outcome
pub fn record_outcome(outcome: &FetchOutcome) {
    let result = match outcome {
        FetchOutcome::Success { .. } => "success",
        FetchOutcome::Failure { reason, .. } => reason.label(),
    };
    counter!("batch_outcomes_total", "result" => result).increment(1);
}

/// Whole-batch timing
pub struct BatchMetrics {
    total: usize,
    start_time: Instant,
}

impl BatchMetrics {
    /// Start tracking a batch of `total` identifiers
    pub fn start(total: usize) -> Self {
        info!(identifiers = total, "Batch started");
        Self {
            total,
            start_time: Instant::now(),
        }
    }

    /// Record batch completion
    pub fn record_complete(&self, results: &ResultSet) {
        let duration = self.start_time.elapsed();
        histogram!("batch_duration_seconds").record(duration.as_secs_f64());

        info!(
            identifiers = self.total,
            outcomes = results.len(),
            succeeded = results.success_count(),
            failed = results.failure_count(),
            duration_secs = duration.as_secs(),
            "Batch completed"
        );
    }
}
