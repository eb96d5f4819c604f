//! Batch scheduler
//!
//! Launches one independent fetch chain per identifier, paced by the
//! [`RateGovernor`], and waits until every chain has reported. The number of
//! chains in flight is not bounded: chains sitting in a retry backoff stay
//! outstanding while later cohorts launch.

use futures::future::join_all;
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

use super::aggregator::{OutcomeSink, ResultAggregator, ResultSet};
use super::config::{BatchConfig, GovernorConfig};
use super::rate_limit::RateGovernor;
use super::retry::RetryPolicy;
use crate::fetcher::SearchExecutor;
use crate::identifier::TemplateId;
use crate::metrics::BatchMetrics;
use crate::shutdown::{self, SharedShutdown, ShutdownCoordinator};
use crate::{FailureReason, FetchOutcome};

/// Everything a finished batch produced
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// One outcome per submitted identifier
    pub results: ResultSet,
    /// Cohort cooldowns taken, in order
    pub cooldowns: Vec<Duration>,
    /// Wall time of the batch
    pub elapsed: Duration,
    /// Whether shutdown or the deadline interrupted the batch
    pub cancelled: bool,
}

/// Runs fetch chains for a list of identifiers
pub struct BatchScheduler<E: ?Sized> {
    executor: Arc<E>,
    config: BatchConfig,
    shutdown: SharedShutdown,
    progress_bar: Option<ProgressBar>,
    progress_interval: Option<Duration>,
}

impl<E> BatchScheduler<E>
where
    E: SearchExecutor + ?Sized + 'static,
{
    /// Create a scheduler sharing `executor` across all chains
    pub fn new(executor: Arc<E>, config: BatchConfig) -> Self {
        Self {
            executor,
            config,
            shutdown: shutdown::get_global_shutdown().unwrap_or_else(ShutdownCoordinator::shared),
            progress_bar: None,
            progress_interval: None,
        }
    }

    /// Attach a shared shutdown handle for cooperative cancellation
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Advance a progress bar as chains complete
    pub fn with_progress_bar(mut self, progress_bar: ProgressBar) -> Self {
        self.progress_bar = Some(progress_bar);
        self
    }

    /// Override the minimum interval between progress log lines
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = Some(interval);
        self
    }

    /// Batch configuration
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run every identifier to a terminal outcome
    ///
    /// Never fails: per-identifier errors become sentinel-priced outcomes and
    /// the returned set holds exactly one outcome per input identifier. The
    /// deadline only cancels this batch; the attached shutdown handle is
    /// never requested by it, so the scheduler can be run again.
    pub async fn run(&self, identifiers: &[TemplateId]) -> BatchReport {
        let total = identifiers.len();
        let batch_metrics = BatchMetrics::start(total);
        let started = Instant::now();

        let (batch_shutdown, forward) = self.shutdown.child();
        let deadline_guard = self
            .config
            .deadline
            .map(|deadline| batch_shutdown.request_after(deadline));

        let (sink, aggregator) = ResultAggregator::channel(total);
        let mut aggregator = aggregator.with_progress_bar(self.progress_bar.clone());
        if let Some(interval) = self.progress_interval {
            aggregator = aggregator.with_progress_interval(interval);
        }

        let (cooldowns, results) = tokio::join!(
            self.launch_all(identifiers, sink, &batch_shutdown),
            aggregator.collect()
        );

        forward.abort();
        if let Some(guard) = deadline_guard {
            guard.abort();
        }

        batch_metrics.record_complete(&results);

        BatchReport {
            results,
            cooldowns,
            elapsed: started.elapsed(),
            cancelled: batch_shutdown.is_shutdown_requested(),
        }
    }

    async fn launch_all(
        &self,
        identifiers: &[TemplateId],
        sink: OutcomeSink,
        shutdown: &SharedShutdown,
    ) -> Vec<Duration> {
        let policy = Arc::new(RetryPolicy::new(self.config.retry.clone()));
        let mut governor = RateGovernor::new(self.config.governor.clone(), identifiers.len());
        let mut chains = Vec::with_capacity(identifiers.len());
        let mut cooldowns = Vec::new();

        for identifier in identifiers {
            if shutdown.is_shutdown_requested() {
                sink.record(FetchOutcome::Failure {
                    identifier: identifier.clone(),
                    reason: FailureReason::Cancelled,
                    attempts: 0,
                });
                continue;
            }

            let chain = tokio::spawn({
                let executor = Arc::clone(&self.executor);
                let policy = Arc::clone(&policy);
                let shutdown = Arc::clone(shutdown);
                let sink = sink.clone();
                let identifier = identifier.clone();
                async move {
                    let outcome = policy.run(executor.as_ref(), &identifier, &shutdown).await;
                    sink.record(outcome);
                }
            });
            chains.push((identifier.clone(), chain));

            if let Some(cooldown) = governor.after_launch(shutdown).await {
                cooldowns.push(cooldown);
            }
        }

        if shutdown.is_shutdown_requested() {
            warn!(
                launched = chains.len(),
                total = identifiers.len(),
                "Shutdown requested - remaining identifiers marked as cancelled"
            );
        }

        info!(launched = chains.len(), "All launches issued, waiting for chains");

        let (launched, handles): (Vec<_>, Vec<_>) = chains.into_iter().unzip();
        for (identifier, joined) in launched.into_iter().zip(join_all(handles).await) {
            // A chain only records after finishing, so a join error means no outcome was sent.
            if let Err(e) = joined {
                error!(template_id = %identifier, error = %e, "Fetch chain terminated abnormally");
                sink.record(FetchOutcome::Failure {
                    identifier,
                    reason: FailureReason::Aborted(e.to_string()),
                    attempts: 0,
                });
            }
        }

        cooldowns
    }
}

/// Fetch every identifier with default retry settings and the given cohort size
///
/// Suspends until all chains have finished and returns the frozen result set.
pub async fn run_batch<E>(
    executor: Arc<E>,
    identifiers: &[TemplateId],
    launch_cohort_size: usize,
) -> ResultSet
where
    E: SearchExecutor + ?Sized + 'static,
{
    let config = BatchConfig {
        governor: GovernorConfig::default().with_cohort_size(launch_cohort_size),
        ..BatchConfig::default()
    };
    BatchScheduler::new(executor, config)
        .run(identifiers)
        .await
        .results
}
