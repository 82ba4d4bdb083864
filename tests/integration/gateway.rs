//! Integration tests for the gateway against a mock upstream

use serde_json::json;
use std::sync::Arc;
use stockwatch::services::provider::{HttpMarketDataProvider, MarketDataProvider, ProviderError};
use stockwatch::services::MarketDataGateway;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quote_body() -> serde_json::Value {
    json!({
        "quoteResponse": {
            "result": [{
                "symbol": "ACME",
                "regularMarketPrice": 100.0
            }]
        }
    })
}

fn gateway_for(server: &MockServer) -> MarketDataGateway {
    let provider: Arc<dyn MarketDataProvider> =
        Arc::new(HttpMarketDataProvider::with_base_url(server.uri()).unwrap());
    MarketDataGateway::new(provider)
}

#[tokio::test]
async fn test_gateway_recovers_from_transient_429() {
    let server = MockServer::start().await;
    // First request is throttled, the retry succeeds.
    Mock::given(method("GET"))
        .and(path("/v7/finance/quote"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v7/finance/quote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote_body()))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let quote = gateway.get_quote("ACME").await.unwrap();

    assert_eq!(quote.price, 100.0);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_gateway_propagates_server_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v7/finance/quote"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let result = gateway.get_quote("ACME").await;

    assert!(matches!(result, Err(ProviderError::Http(_))));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_gateway_caches_across_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v7/finance/quote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote_body()))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    gateway.get_quote("ACME").await.unwrap();
    gateway.get_quote("ACME").await.unwrap();
    gateway.get_quote("acme").await.unwrap();

    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
