//! Concurrent, rate-limited, retrying bulk fetch engine
//!
//! # Overview
//!
//! 1. **Scheduling**: [`scheduler::BatchScheduler`] launches one fetch chain per identifier
//! 2. **Pacing**: [`rate_limit::RateGovernor`] pauses launches after every cohort
//! 3. **Retry**: [`retry::RetryPolicy`] drives each chain through its bounded state machine
//! 4. **Aggregation**: [`aggregator::ResultAggregator`] collects outcomes into a [`ResultSet`]
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use skin_arbitrage::downloader::{BatchConfig, BatchScheduler};
//! use skin_arbitrage::fetcher::youpin_http::YoupinSearchClient;
//! use skin_arbitrage::identifier::TemplateId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(YoupinSearchClient::with_default_endpoint()?);
//! let ids = vec![TemplateId::parse("44172")?];
//!
//! let report = BatchScheduler::new(client, BatchConfig::default().with_cohort_size(50))
//!     .run(&ids)
//!     .await;
//! println!("{} outcomes, {} cooldowns", report.results.len(), report.cooldowns.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Nothing here returns an error. Transient faults are retried, everything
//! else becomes a [`crate::FetchOutcome::Failure`] carrying the sentinel price.
//!
//! # Related Modules
//!
//! - [`crate::fetcher`] - Request execution and response parsing
//! - [`crate::shutdown`] - Cancellation shared with every chain

pub mod aggregator;
pub mod config;
pub mod progress;
pub mod rate_limit;
pub mod retry;
pub mod scheduler;

pub use aggregator::{OutcomeSink, ResultAggregator, ResultSet};
pub use config::{BatchConfig, GovernorConfig, RetryConfig};
pub use rate_limit::RateGovernor;
pub use retry::{ChainState, RetryPolicy};
pub use scheduler::{run_batch, BatchReport, BatchScheduler};
