//! External market data provider: trait, error taxonomy and HTTP client.

use crate::config;
use crate::models::{Bar, BarInterval, Quote};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Provider failure classes. Only `RateLimited` is retryable; everything
/// else propagates to the caller immediately.
#[derive(Debug)]
pub enum ProviderError {
    RateLimited(String),
    Http(reqwest::Error),
    InvalidResponse(String),
    NoData(String),
}

impl ProviderError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited(_))
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::RateLimited(msg) => write!(f, "Rate limited: {}", msg),
            ProviderError::Http(e) => write!(f, "HTTP error: {}", e),
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ProviderError::NoData(symbol) => write!(f, "No data for symbol {}", symbol),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) {
            ProviderError::RateLimited(e.to_string())
        } else {
            ProviderError::Http(e)
        }
    }
}

/// External quote/history/news source. Any call may fail on an invalid
/// symbol, a network problem or provider throttling.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<Quote, ProviderError>;

    async fn historical(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
        interval: BarInterval,
    ) -> Result<Vec<Bar>, ProviderError>;

    /// Number of recent news items mentioning the symbol.
    async fn news_count(&self, symbol: &str) -> Result<usize, ProviderError>;
}

// Wire shapes of the provider's chart/quote/search endpoints. Numeric
// arrays carry nulls for halted sessions, hence the nested Options.

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize, Default)]
struct ChartQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteBody,
}

#[derive(Debug, Deserialize)]
struct QuoteBody {
    result: Vec<QuoteResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResult {
    symbol: String,
    regular_market_price: Option<f64>,
    regular_market_change_percent: Option<f64>,
    regular_market_volume: Option<f64>,
    regular_market_open: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_previous_close: Option<f64>,
    currency: Option<String>,
    market_state: Option<String>,
    short_name: Option<String>,
    full_exchange_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    news: Vec<serde_json::Value>,
}

/// HTTP implementation against a Yahoo-style finance API.
pub struct HttpMarketDataProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMarketDataProvider {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(config::get_provider_base_url())
    }

    pub fn with_base_url(base_url: String) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ProviderError::Http)?;

        Ok(Self { client, base_url })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, ProviderError> {
        let response = self.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited("Too Many Requests".to_string()));
        }

        let response = response.error_for_status()?;
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl MarketDataProvider for HttpMarketDataProvider {
    async fn quote(&self, symbol: &str) -> Result<Quote, ProviderError> {
        let url = format!("{}/v7/finance/quote?symbols={}", self.base_url, symbol);
        let envelope: QuoteEnvelope = self.get_json(&url).await?;

        let result = envelope
            .quote_response
            .result
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NoData(symbol.to_string()))?;

        let price = result
            .regular_market_price
            .ok_or_else(|| ProviderError::NoData(symbol.to_string()))?;

        Ok(Quote {
            symbol: result.symbol,
            price,
            change_percent: result.regular_market_change_percent.unwrap_or(0.0),
            volume: result.regular_market_volume.unwrap_or(0.0),
            open: result.regular_market_open.unwrap_or(price),
            high: result.regular_market_day_high.unwrap_or(price),
            low: result.regular_market_day_low.unwrap_or(price),
            previous_close: result.regular_market_previous_close.unwrap_or(price),
            currency: result.currency,
            market_state: result.market_state,
            name: result.short_name,
            exchange: result.full_exchange_name,
        })
    }

    async fn historical(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
        interval: BarInterval,
    ) -> Result<Vec<Bar>, ProviderError> {
        let period1 = from
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);
        let period2 = to
            .and_hms_opt(23, 59, 59)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);

        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval={}",
            self.base_url,
            symbol,
            period1,
            period2,
            interval.as_str()
        );
        let envelope: ChartEnvelope = self.get_json(&url).await?;

        let result = envelope
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| ProviderError::NoData(symbol.to_string()))?;

        let timestamps = result.timestamp.unwrap_or_default();
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

        let opens = quote.open.unwrap_or_default();
        let highs = quote.high.unwrap_or_default();
        let lows = quote.low.unwrap_or_default();
        let closes = quote.close.unwrap_or_default();
        let volumes = quote.volume.unwrap_or_default();

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, ts) in timestamps.iter().enumerate() {
            let date = match DateTime::from_timestamp(*ts, 0) {
                Some(dt) => dt.date_naive(),
                None => continue,
            };
            // Skip bars the provider left incomplete.
            let (open, high, low, close) = match (
                opens.get(i).copied().flatten(),
                highs.get(i).copied().flatten(),
                lows.get(i).copied().flatten(),
                closes.get(i).copied().flatten(),
            ) {
                (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
                _ => continue,
            };
            let volume = volumes.get(i).copied().flatten().unwrap_or(0.0);

            bars.push(Bar::new(date, open, high, low, close, volume));
        }

        Ok(bars)
    }

    async fn news_count(&self, symbol: &str) -> Result<usize, ProviderError> {
        let url = format!(
            "{}/v1/finance/search?q={}&newsCount=10&quotesCount=0",
            self.base_url, symbol
        );
        let envelope: SearchEnvelope = self.get_json(&url).await?;
        Ok(envelope.news.len())
    }
}
