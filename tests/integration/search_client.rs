//! reqwest search client classification against a loopback server

use crate::common::{listing_body, CannedResponse, LoopbackServer};
use serde_json::Value;
use skin_arbitrage::fetcher::shared_resources::build_http_client;
use skin_arbitrage::fetcher::youpin_http::YoupinSearchClient;
use skin_arbitrage::fetcher::{SearchExecutor, SearchResponse};
use skin_arbitrage::identifier::TemplateId;
use std::sync::Arc;

fn client_for(url: &str) -> YoupinSearchClient {
    YoupinSearchClient::new(Arc::new(build_http_client().unwrap()), url)
}

#[tokio::test]
async fn test_ok_response_carries_body() {
    let body = listing_body("AK-47 | Slate (Field-Tested)", "19.5");
    let server = LoopbackServer::start(vec![CannedResponse::json(200, &body)]).await;

    let response = client_for(&server.url).search(&TemplateId::from(553370)).await;
    assert_eq!(response, SearchResponse::Ok(body));

    let requests = server.request_bodies();
    assert_eq!(requests.len(), 1);
    let sent: Value = serde_json::from_str(&requests[0]).unwrap();
    assert_eq!(sent["templateId"], "553370");
    assert_eq!(sent["pageSize"], 20);
    assert_eq!(sent["listSortType"], "1");
}

#[tokio::test]
async fn test_retryable_statuses() {
    let server = LoopbackServer::start(vec![
        CannedResponse::raw(429, "slow down"),
        CannedResponse::raw(500, ""),
        CannedResponse::raw(504, ""),
    ])
    .await;
    let client = client_for(&server.url);
    let id = TemplateId::from(1);

    assert_eq!(client.search(&id).await, SearchResponse::Retryable(429));
    assert_eq!(client.search(&id).await, SearchResponse::Retryable(500));
    assert_eq!(client.search(&id).await, SearchResponse::Retryable(504));
}

#[tokio::test]
async fn test_other_statuses_are_fatal() {
    let server = LoopbackServer::start(vec![
        CannedResponse::raw(403, "forbidden"),
        CannedResponse::raw(502, ""),
    ])
    .await;
    let client = client_for(&server.url);
    let id = TemplateId::from(1);

    assert_eq!(client.search(&id).await, SearchResponse::Fatal(403));
    assert_eq!(client.search(&id).await, SearchResponse::Fatal(502));
}

#[tokio::test]
async fn test_unreadable_body_is_transport_error() {
    let server = LoopbackServer::start(vec![CannedResponse::raw(200, "<html>maintenance</html>")]).await;

    let response = client_for(&server.url).search(&TemplateId::from(1)).await;
    assert!(matches!(response, SearchResponse::TransportError(_)));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let response = client_for(&url).search(&TemplateId::from(1)).await;
    assert!(matches!(response, SearchResponse::TransportError(_)));
}
