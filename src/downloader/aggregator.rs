//! Result aggregation
//!
//! Fetch chains send their terminal outcome through an [`OutcomeSink`]; a
//! single [`ResultAggregator`] drains the channel, so the result vector has
//! exactly one writer. The aggregator finishes once every sink clone has been
//! dropped and hands back a frozen [`ResultSet`].

use indicatif::ProgressBar;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::progress::BatchProgress;
use crate::identifier::TemplateId;
use crate::metrics;
use crate::{FetchOutcome, SENTINEL_PRICE};

/// Immutable collection of outcomes, one per submitted identifier
///
/// Order follows completion order and carries no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    outcomes: Vec<FetchOutcome>,
}

impl ResultSet {
    /// Number of outcomes
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Iterate over all outcomes
    pub fn iter(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes.iter()
    }

    /// First outcome recorded for `identifier`
    pub fn get(&self, identifier: &TemplateId) -> Option<&FetchOutcome> {
        self.outcomes.iter().find(|o| o.identifier() == identifier)
    }

    /// Number of outcomes carrying a listing
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of outcomes carrying the sentinel price
    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    /// `(identifier, price)` pairs with sentinel-priced outcomes removed
    ///
    /// A genuine listing at or below the sentinel is indistinguishable from
    /// a failure in the exported price column, so it is dropped as well.
    pub fn priced(&self) -> impl Iterator<Item = (&TemplateId, Decimal)> {
        self.outcomes
            .iter()
            .map(|o| (o.identifier(), o.price()))
            .filter(|(_, price)| *price > SENTINEL_PRICE)
    }

    /// Price lookup keyed by identifier, first outcome wins
    pub fn price_index(&self) -> HashMap<&TemplateId, Decimal> {
        let mut index = HashMap::with_capacity(self.len());
        for (id, price) in self.priced() {
            index.entry(id).or_insert(price);
        }
        index
    }

    /// Take ownership of the outcomes
    pub fn into_outcomes(self) -> Vec<FetchOutcome> {
        self.outcomes
    }
}

impl FromIterator<FetchOutcome> for ResultSet {
    fn from_iter<I: IntoIterator<Item = FetchOutcome>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a FetchOutcome;
    type IntoIter = std::slice::Iter<'a, FetchOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

/// Sending half handed to every fetch chain
#[derive(Debug, Clone)]
pub struct OutcomeSink {
    tx: mpsc::UnboundedSender<FetchOutcome>,
}

impl OutcomeSink {
    /// Deliver a terminal outcome
    pub fn record(&self, outcome: FetchOutcome) {
        if let Err(e) = self.tx.send(outcome) {
            debug!(template_id = %e.0.identifier(), "Aggregator closed, outcome dropped");
        }
    }
}

/// Single consumer of all outcomes
pub struct ResultAggregator {
    rx: mpsc::UnboundedReceiver<FetchOutcome>,
    progress: BatchProgress,
    progress_bar: Option<ProgressBar>,
}

impl ResultAggregator {
    /// Create a sink/aggregator pair for a batch of `expected` identifiers
    pub fn channel(expected: usize) -> (OutcomeSink, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let aggregator = Self {
            rx,
            progress: BatchProgress::new(expected),
            progress_bar: None,
        };
        (OutcomeSink { tx }, aggregator)
    }

    /// Advance a progress bar as outcomes arrive
    pub fn with_progress_bar(mut self, progress_bar: Option<ProgressBar>) -> Self {
        self.progress_bar = progress_bar;
        self
    }

    /// Override the minimum interval between progress log lines
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress = self.progress.with_update_interval(interval);
        self
    }

    /// Drain outcomes until every sink is dropped
    pub async fn collect(mut self) -> ResultSet {
        let mut outcomes = Vec::with_capacity(self.progress.total);

        while let Some(outcome) = self.rx.recv().await {
            metrics::record_outcome(&outcome);
            if let Some(pb) = &self.progress_bar {
                pb.inc(1);
            }
            if self.progress.record(&outcome) {
                info!("{}", self.progress.format());
            }
            outcomes.push(outcome);
        }

        if let Some(pb) = &self.progress_bar {
            pb.finish_and_clear();
        }

        ResultSet { outcomes }
    }
}
