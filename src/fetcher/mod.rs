//! HTTP clients and response parsing
//!
//! The batch engine only depends on [`SearchExecutor`]: one outbound query per
//! identifier with the response classified into a [`SearchResponse`]. The
//! reqwest-backed implementation lives in [`youpin_http`]; the bulk price
//! list used to build the identifier list lives in [`waxpeer`].

use crate::identifier::TemplateId;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub mod shared_resources;
pub mod waxpeer;
pub mod youpin_http;
pub mod youpin_parser;

/// Fetcher errors for the one-shot collaborator calls
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Non-success HTTP status
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Response parse error
    #[error("parse error: {0}")]
    ParseError(String),

    /// Response parsed but is missing expected content
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    NetworkError(String),

    /// HTTP client could not be constructed
    #[error("client error: {0}")]
    ClientError(String),
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Classified result of a single search request
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResponse {
    /// Status 200 with a structured body
    Ok(Value),
    /// Throttled or transient server error (429, 500, 504)
    Retryable(u16),
    /// Any other non-200 status
    Fatal(u16),
    /// Connection-level failure (timeout, DNS, reset) or unreadable body
    TransportError(String),
}

/// Status codes worth retrying after a backoff
pub const RETRYABLE_STATUSES: [u16; 3] = [429, 500, 504];

impl SearchResponse {
    /// Classify a non-200 HTTP status
    ///
    /// ```
    /// use skin_arbitrage::fetcher::SearchResponse;
    ///
    /// assert_eq!(SearchResponse::from_error_status(429), SearchResponse::Retryable(429));
    /// assert_eq!(SearchResponse::from_error_status(502), SearchResponse::Fatal(502));
    /// ```
    pub fn from_error_status(status: u16) -> Self {
        if RETRYABLE_STATUSES.contains(&status) {
            Self::Retryable(status)
        } else {
            Self::Fatal(status)
        }
    }

    /// Label used for metrics
    pub fn status_label(&self) -> String {
        match self {
            Self::Ok(_) => "200".to_string(),
            Self::Retryable(status) | Self::Fatal(status) => status.to_string(),
            Self::TransportError(_) => "transport_error".to_string(),
        }
    }
}

/// Issues one search request for an identifier
///
/// Implementations send exactly one request per call and do not retry or
/// log business state; that is the caller's concern.
#[async_trait]
pub trait SearchExecutor: Send + Sync {
    /// Query the first page of available listings for `identifier`,
    /// cheapest first
    async fn search(&self, identifier: &TemplateId) -> SearchResponse;
}

#[async_trait]
impl<T: SearchExecutor + ?Sized> SearchExecutor for Arc<T> {
    async fn search(&self, identifier: &TemplateId) -> SearchResponse {
        (**self).search(identifier).await
    }
}
