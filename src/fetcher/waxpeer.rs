//! Bulk price-list client
//!
//! One GET returns the lowest asking price of every item on the price-list
//! marketplace. Prices are integers in thousandths of a US dollar.

use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::shared_resources::global_http_client;
use super::{FetcherError, FetcherResult};

/// Default price-list endpoint
pub const DEFAULT_PRICES_URL: &str = "https://api.waxpeer.com/v1/prices";

/// One row of the bulk price list
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PriceListItem {
    /// Market name of the item
    pub name: String,
    /// Lowest asking price in 1/1000 USD
    pub min: i64,
}

#[derive(Debug, Deserialize)]
struct PriceListBody {
    items: Option<Vec<PriceListItem>>,
}

/// Client for the bulk price-list endpoint
#[derive(Debug, Clone)]
pub struct PriceListClient {
    client: Arc<Client>,
    url: String,
}

impl PriceListClient {
    /// Create a client against an explicit URL
    pub fn new(client: Arc<Client>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Create a client using the shared connection pool and default URL
    pub fn with_default_url() -> FetcherResult<Self> {
        Ok(Self::new(global_http_client()?, DEFAULT_PRICES_URL))
    }

    /// Download the full price list
    ///
    /// # Errors
    /// Returns [`FetcherError::HttpError`] on a non-200 status and
    /// [`FetcherError::InvalidResponse`] if the body has no `items` key.
    pub async fn fetch_items(&self) -> FetcherResult<Vec<PriceListItem>> {
        debug!(url = %self.url, "Requesting price list");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetcherError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetcherError::HttpError(format!(
                "Failed to retrieve price list. Status code: {}",
                status.as_u16()
            )));
        }

        let body: PriceListBody = response
            .json()
            .await
            .map_err(|e| FetcherError::ParseError(format!("Failed to deserialize price list: {e}")))?;

        let items = body.items.ok_or_else(|| {
            FetcherError::InvalidResponse("The 'items' key is not found in the response".to_string())
        })?;

        info!(items = items.len(), "Price list downloaded");
        Ok(items)
    }
}
