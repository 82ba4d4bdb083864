//! Integration tests for the HTTP market data provider

use chrono::NaiveDate;
use serde_json::json;
use stockwatch::models::BarInterval;
use stockwatch::services::provider::{HttpMarketDataProvider, MarketDataProvider, ProviderError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quote_body() -> serde_json::Value {
    json!({
        "quoteResponse": {
            "result": [{
                "symbol": "ACME",
                "regularMarketPrice": 189.5,
                "regularMarketChangePercent": 1.25,
                "regularMarketVolume": 52000000.0,
                "regularMarketOpen": 187.0,
                "regularMarketDayHigh": 190.2,
                "regularMarketDayLow": 186.4,
                "regularMarketPreviousClose": 187.2,
                "currency": "USD",
                "marketState": "REGULAR",
                "shortName": "Acme Corp",
                "fullExchangeName": "NasdaqGS"
            }]
        }
    })
}

#[tokio::test]
async fn test_quote_parses_provider_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v7/finance/quote"))
        .and(query_param("symbols", "ACME"))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote_body()))
        .mount(&server)
        .await;

    let provider = HttpMarketDataProvider::with_base_url(server.uri()).unwrap();
    let quote = provider.quote("ACME").await.unwrap();

    assert_eq!(quote.symbol, "ACME");
    assert_eq!(quote.price, 189.5);
    assert_eq!(quote.change_percent, 1.25);
    assert_eq!(quote.previous_close, 187.2);
    assert_eq!(quote.currency.as_deref(), Some("USD"));
    assert_eq!(quote.name.as_deref(), Some("Acme Corp"));
}

#[tokio::test]
async fn test_quote_empty_result_is_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v7/finance/quote"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"quoteResponse": {"result": []}})),
        )
        .mount(&server)
        .await;

    let provider = HttpMarketDataProvider::with_base_url(server.uri()).unwrap();
    let result = provider.quote("GONE").await;
    assert!(matches!(result, Err(ProviderError::NoData(_))));
}

#[tokio::test]
async fn test_historical_skips_incomplete_bars() {
    let server = MockServer::start().await;
    // Three sessions; the middle one has a null close and must be dropped.
    let body = json!({
        "chart": {
            "result": [{
                "timestamp": [1735689600, 1735776000, 1735862400],
                "indicators": {
                    "quote": [{
                        "open":   [100.0, 101.0, 102.0],
                        "high":   [101.0, 102.0, 103.0],
                        "low":    [99.0, 100.0, 101.0],
                        "close":  [100.5, null, 102.5],
                        "volume": [1000.0, 1100.0, null]
                    }]
                }
            }]
        }
    });
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/ACME"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let provider = HttpMarketDataProvider::with_base_url(server.uri()).unwrap();
    let from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
    let bars = provider
        .historical("ACME", from, to, BarInterval::Daily)
        .await
        .unwrap();

    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    assert_eq!(bars[0].close, 100.5);
    assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());
    // Missing volume defaults to 0 rather than dropping the bar.
    assert_eq!(bars[1].volume, 0.0);
}

#[tokio::test]
async fn test_news_count_from_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/finance/search"))
        .and(query_param("q", "ACME"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "news": [{"title": "a"}, {"title": "b"}, {"title": "c"}]
        })))
        .mount(&server)
        .await;

    let provider = HttpMarketDataProvider::with_base_url(server.uri()).unwrap();
    assert_eq!(provider.news_count("ACME").await.unwrap(), 3);
}

#[tokio::test]
async fn test_429_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let provider = HttpMarketDataProvider::with_base_url(server.uri()).unwrap();
    let result = provider.quote("ACME").await;
    assert!(matches!(result, Err(ProviderError::RateLimited(_))));
}

#[tokio::test]
async fn test_500_maps_to_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let provider = HttpMarketDataProvider::with_base_url(server.uri()).unwrap();
    let result = provider.quote("ACME").await;
    match result {
        Err(e) => assert!(!e.is_rate_limited()),
        Ok(_) => panic!("expected an error on 500"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let provider = HttpMarketDataProvider::with_base_url(server.uri()).unwrap();
    let result = provider.quote("ACME").await;
    assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
}
