//! # Skin Arbitrage Library
//!
//! Cross-references item prices between two online marketplaces for virtual
//! goods. A bulk price list is downloaded from one marketplace, each item is
//! mapped to the second marketplace's catalog identifier, the second
//! marketplace is queried once per identifier, and both price sets are joined
//! into a report of arbitrage candidates.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use skin_arbitrage::downloader::run_batch;
//! use skin_arbitrage::fetcher::youpin_http::YoupinSearchClient;
//! use skin_arbitrage::identifier::TemplateId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = YoupinSearchClient::with_default_endpoint()?;
//! let ids = vec![TemplateId::parse("44172")?, TemplateId::parse("553370")?];
//!
//! let results = run_batch(Arc::new(client), &ids, 100).await;
//! for (id, price) in results.priced() {
//!     println!("{id}: {price}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`identifier`] - Remote catalog identifiers
//! - [`fetcher`] - Search request executor, response parsing, price-list client
//! - [`downloader`] - Retry policy, rate governor, batch scheduler, result aggregator
//! - [`catalog`] - Name to identifier lookup and name normalization
//! - [`report`] - Filtering, currency conversion and the final join
//! - [`output`] - CSV writers
//! - [`shutdown`] - Cooperative cancellation shared by all fetch chains
//! - [`metrics`] - Optional Prometheus counters
//! - [`cli`] - `scan` and `fetch` commands
//!
//! ## Failure model
//!
//! The batch never fails as a whole. Every identifier produces exactly one
//! [`FetchOutcome`]; failed identifiers carry [`SENTINEL_PRICE`] so the
//! report stage can drop them.

#![warn(missing_docs)]
#![warn(clippy::all)]

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Name to identifier lookup table
pub mod catalog;

/// CLI command implementations
pub mod cli;

/// Batch fetch engine
pub mod downloader;

/// HTTP clients and response parsing
pub mod fetcher;

/// Remote catalog identifier parsing
pub mod identifier;

/// Metrics collection
pub mod metrics;

/// CSV output writers
pub mod output;

/// Price list filtering and report join
pub mod report;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

pub use downloader::{run_batch, ResultSet};
pub use identifier::TemplateId;

/// Placeholder price carried by every failed outcome
///
/// Distinguishes "fetched but no usable data" from a genuine price.
pub const SENTINEL_PRICE: Decimal = Decimal::ONE;

/// Lowest-priced listing for one catalog item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    /// Display name of the item
    pub name: String,
    /// Asking price in the search marketplace's currency
    pub price: Decimal,
    /// Seller display name
    pub seller: String,
}

/// Why an identifier's fetch chain ended without a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Every attempt was throttled or hit a transient server error
    RetriesExhausted {
        /// Status of the final attempt
        last_status: u16,
    },
    /// Non-retryable HTTP status
    HttpStatus(u16),
    /// Connection-level failure or unreadable body
    Transport(String),
    /// The response parsed but held no usable listing
    NoListing(String),
    /// Shutdown or deadline interrupted the chain
    Cancelled,
    /// The chain's task terminated abnormally
    Aborted(String),
}

impl FailureReason {
    /// Short machine-friendly label used in metrics and CSV output
    pub fn label(&self) -> &'static str {
        match self {
            Self::RetriesExhausted { .. } => "retries_exhausted",
            Self::HttpStatus(_) => "http_status",
            Self::Transport(_) => "transport",
            Self::NoListing(_) => "no_listing",
            Self::Cancelled => "cancelled",
            Self::Aborted(_) => "aborted",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RetriesExhausted { last_status } => {
                write!(f, "retries exhausted (last status {last_status})")
            }
            Self::HttpStatus(status) => write!(f, "HTTP status {status}"),
            Self::Transport(cause) => write!(f, "transport error: {cause}"),
            Self::NoListing(cause) => write!(f, "no listing: {cause}"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::Aborted(cause) => write!(f, "aborted: {cause}"),
        }
    }
}

/// Terminal result of one identifier's fetch chain
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A listing was extracted
    Success {
        /// Identifier that was fetched
        identifier: TemplateId,
        /// Cheapest listing found
        listing: Listing,
        /// Number of requests issued
        attempts: u32,
    },
    /// No listing; reported with [`SENTINEL_PRICE`]
    Failure {
        /// Identifier that was fetched
        identifier: TemplateId,
        /// Why the chain failed
        reason: FailureReason,
        /// Number of requests issued
        attempts: u32,
    },
}

impl FetchOutcome {
    /// Identifier this outcome belongs to
    pub fn identifier(&self) -> &TemplateId {
        match self {
            Self::Success { identifier, .. } | Self::Failure { identifier, .. } => identifier,
        }
    }

    /// Listing price, or [`SENTINEL_PRICE`] for failures
    pub fn price(&self) -> Decimal {
        match self {
            Self::Success { listing, .. } => listing.price,
            Self::Failure { .. } => SENTINEL_PRICE,
        }
    }

    /// Number of requests the chain issued
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. } | Self::Failure { attempts, .. } => *attempts,
        }
    }

    /// Whether a listing was found
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The listing, if any
    pub fn listing(&self) -> Option<&Listing> {
        match self {
            Self::Success { listing, .. } => Some(listing),
            Self::Failure { .. } => None,
        }
    }

    /// The failure reason, if any
    pub fn failure_reason(&self) -> Option<&FailureReason> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason, .. } => Some(reason),
        }
    }
}
