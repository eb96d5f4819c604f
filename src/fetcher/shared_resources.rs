//! Shared HTTP connection pool
//!
//! Every fetch chain in a batch shares one [`reqwest::Client`] so that
//! connections are pooled across thousands of concurrent requests. The client
//! is only read after construction.

use once_cell::sync::OnceCell;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use super::{FetcherError, FetcherResult};

/// HTTP connect timeout (seconds) - time to establish TCP connection
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
/// HTTP request timeout (seconds) - overall time for the entire request
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

static GLOBAL_HTTP_CLIENT: OnceCell<Arc<Client>> = OnceCell::new();

/// Build a client with explicit timeouts so a stalled request cannot hang a
/// fetch chain forever
pub fn build_http_client() -> FetcherResult<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| {
            FetcherError::ClientError(format!(
                "Failed to build HTTP client: {e}. Check system TLS configuration."
            ))
        })
}

/// Get the process-wide HTTP client
///
/// Returns a clone of the Arc, which is cheap (just increments ref count)
pub fn global_http_client() -> FetcherResult<Arc<Client>> {
    GLOBAL_HTTP_CLIENT
        .get_or_try_init(|| build_http_client().map(Arc::new))
        .cloned()
}
