//! Marketplace search client
//!
//! Sends one POST per identifier to the paged commodity search endpoint and
//! classifies the response for the retry policy. The client never retries and
//! never logs business state; both are the caller's concern.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::shared_resources::global_http_client;
use super::{FetcherResult, SearchExecutor, SearchResponse};
use crate::identifier::TemplateId;

/// Default search endpoint
pub const DEFAULT_SEARCH_URL: &str =
    "https://api.youpin898.com/api/homepage/es/commodity/GetCsGoPagedList";

/// Listings requested per page
pub const PAGE_SIZE: u32 = 20;

/// Request body for the paged commodity search
///
/// Filters to listings that are on sale, sorted ascending by price, first
/// page only.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchPayload {
    has_sold: &'static str,
    have_bu_zhang_type: u8,
    list_sort_type: &'static str,
    list_type: u8,
    page_index: u32,
    page_size: u32,
    sort_type: &'static str,
    status: &'static str,
    stickers_is_sort: bool,
    template_id: String,
    user_id: &'static str,
}

impl SearchPayload {
    /// Build the first-page, cheapest-first query for one identifier
    pub fn for_template(identifier: &TemplateId) -> Self {
        Self {
            has_sold: "true",
            have_bu_zhang_type: 0,
            list_sort_type: "1",
            list_type: 10,
            page_index: 1,
            page_size: PAGE_SIZE,
            sort_type: "1",
            status: "20",
            stickers_is_sort: false,
            template_id: identifier.to_string(),
            user_id: "",
        }
    }
}

/// reqwest-backed [`SearchExecutor`]
#[derive(Debug, Clone)]
pub struct YoupinSearchClient {
    client: Arc<Client>,
    endpoint: String,
}

impl YoupinSearchClient {
    /// Create a client against an explicit endpoint
    ///
    /// # Arguments
    /// * `client` - Shared HTTP client (Arc for cheap cloning)
    /// * `endpoint` - Full search URL
    pub fn new(client: Arc<Client>, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Create a client using the shared connection pool and default endpoint
    pub fn with_default_endpoint() -> FetcherResult<Self> {
        Ok(Self::new(global_http_client()?, DEFAULT_SEARCH_URL))
    }

    /// Search endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SearchExecutor for YoupinSearchClient {
    async fn search(&self, identifier: &TemplateId) -> SearchResponse {
        let payload = SearchPayload::for_template(identifier);

        let response = match self.client.post(&self.endpoint).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => return SearchResponse::TransportError(e.to_string()),
        };

        let status = response.status();
        if status != StatusCode::OK {
            return SearchResponse::from_error_status(status.as_u16());
        }

        match response.json::<Value>().await {
            Ok(body) => SearchResponse::Ok(body),
            Err(e) => SearchResponse::TransportError(format!("unreadable response body: {e}")),
        }
    }
}
