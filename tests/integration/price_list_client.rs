//! Price-list client against a loopback server

use crate::common::{CannedResponse, LoopbackServer};
use serde_json::json;
use skin_arbitrage::fetcher::shared_resources::build_http_client;
use skin_arbitrage::fetcher::waxpeer::{PriceListClient, PriceListItem};
use skin_arbitrage::fetcher::FetcherError;
use std::sync::Arc;

fn client_for(url: &str) -> PriceListClient {
    PriceListClient::new(Arc::new(build_http_client().unwrap()), url)
}

#[tokio::test]
async fn test_fetch_items() {
    let body = json!({
        "success": true,
        "items": [
            { "name": "AK-47 | Slate (Field-Tested)", "min": 2450, "count": 31 },
            { "name": "★ Karambit | Doppler Phase 2 (Factory New)", "min": 812000, "count": 2 }
        ]
    });
    let server = LoopbackServer::start(vec![CannedResponse::json(200, &body)]).await;

    let items = client_for(&server.url).fetch_items().await.unwrap();
    assert_eq!(
        items,
        vec![
            PriceListItem {
                name: "AK-47 | Slate (Field-Tested)".to_string(),
                min: 2450
            },
            PriceListItem {
                name: "★ Karambit | Doppler Phase 2 (Factory New)".to_string(),
                min: 812000
            },
        ]
    );
}

#[tokio::test]
async fn test_missing_items_key() {
    let server =
        LoopbackServer::start(vec![CannedResponse::json(200, &json!({ "success": false }))]).await;

    let err = client_for(&server.url).fetch_items().await.unwrap_err();
    assert!(matches!(err, FetcherError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_error_status() {
    let server = LoopbackServer::start(vec![CannedResponse::raw(503, "")]).await;

    let err = client_for(&server.url).fetch_items().await.unwrap_err();
    match err {
        FetcherError::HttpError(msg) => assert!(msg.contains("503")),
        other => panic!("unexpected error: {other:?}"),
    }
}
