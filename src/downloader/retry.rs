//! Per-identifier retry policy
//!
//! Each identifier's fetch chain is a bounded state machine:
//!
//! ```text
//! Attempting(n) --Ok + listing-------------> Succeeded
//! Attempting(n) --Ok + no listing----------> Failed
//! Attempting(n) --Retryable, n > 0--------> Attempting(n - 1)   (after backoff)
//! Attempting(0) --Retryable----------------> Failed
//! Attempting(n) --Fatal | TransportError---> Failed
//! ```
//!
//! Succeeded and Failed are absorbing. Shape failures in a 200 response are
//! not retried.

use tracing::{debug, warn};

use super::config::RetryConfig;
use crate::fetcher::youpin_parser::extract_cheapest;
use crate::fetcher::{SearchExecutor, SearchResponse};
use crate::identifier::TemplateId;
use crate::metrics;
use crate::shutdown::ShutdownCoordinator;
use crate::{FailureReason, FetchOutcome, Listing};

/// State of one identifier's fetch chain
#[derive(Debug, Clone, PartialEq)]
pub enum ChainState {
    /// Another request is due; `remaining` retries are left after it
    Attempting {
        /// Retries left
        remaining: u32,
    },
    /// A listing was extracted
    Succeeded(Listing),
    /// The chain ended without a listing
    Failed(FailureReason),
}

impl ChainState {
    /// Initial state for a budget of `max_retries` additional attempts
    pub fn initial(max_retries: u32) -> Self {
        Self::Attempting {
            remaining: max_retries,
        }
    }

    /// Whether no further requests will be issued
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Attempting { .. })
    }

    /// Transition on a classified response
    ///
    /// Terminal states ignore further responses.
    pub fn on_response(self, response: SearchResponse) -> Self {
        let remaining = match self {
            Self::Attempting { remaining } => remaining,
            terminal => return terminal,
        };

        match response {
            SearchResponse::Ok(body) => match extract_cheapest(&body) {
                Ok(listing) => Self::Succeeded(listing),
                Err(e) => Self::Failed(FailureReason::NoListing(e.to_string())),
            },
            SearchResponse::Retryable(_) if remaining > 0 => Self::Attempting {
                remaining: remaining - 1,
            },
            SearchResponse::Retryable(status) => {
                Self::Failed(FailureReason::RetriesExhausted {
                    last_status: status,
                })
            }
            SearchResponse::Fatal(status) => Self::Failed(FailureReason::HttpStatus(status)),
            SearchResponse::TransportError(cause) => Self::Failed(FailureReason::Transport(cause)),
        }
    }
}

/// Wraps a [`SearchExecutor`] with bounded, jittered retries
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a policy from explicit parameters
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Retry parameters
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Drive one identifier's chain to a terminal outcome
    ///
    /// Always returns exactly one outcome. A shutdown request interrupts a
    /// pending backoff and resolves the chain as cancelled.
    pub async fn run<E>(
        &self,
        executor: &E,
        identifier: &TemplateId,
        shutdown: &ShutdownCoordinator,
    ) -> FetchOutcome
    where
        E: SearchExecutor + ?Sized,
    {
        let mut state = ChainState::initial(self.config.max_retries);
        let mut attempts = 0u32;

        let result = loop {
            if shutdown.is_shutdown_requested() {
                break Err(FailureReason::Cancelled);
            }

            attempts += 1;
            let response = executor.search(identifier).await;
            metrics::record_search_response(&response);
            let status = response.status_label();

            state = match state.on_response(response) {
                ChainState::Succeeded(listing) => break Ok(listing),
                ChainState::Failed(reason) => break Err(reason),
                attempting => attempting,
            };

            if shutdown.is_shutdown_requested() {
                break Err(FailureReason::Cancelled);
            }

            let delay = self.config.draw_backoff();
            warn!(
                template_id = %identifier,
                attempt = attempts,
                status = %status,
                delay_ms = delay.as_millis() as u64,
                "Transient upstream error, retrying after backoff"
            );
            metrics::record_retry_backoff(delay, attempts);

            if !shutdown.sleep_unless_shutdown(delay).await {
                break Err(FailureReason::Cancelled);
            }
        };

        match result {
            Ok(listing) => {
                debug!(
                    template_id = %identifier,
                    name = %listing.name,
                    price = %listing.price,
                    seller = %listing.seller,
                    attempts = attempts,
                    "Completed"
                );
                FetchOutcome::Success {
                    identifier: identifier.clone(),
                    listing,
                    attempts,
                }
            }
            Err(reason) => {
                warn!(
                    template_id = %identifier,
                    attempts = attempts,
                    reason = %reason,
                    "No valid data for template"
                );
                FetchOutcome::Failure {
                    identifier: identifier.clone(),
                    reason,
                    attempts,
                }
            }
        }
    }
}
