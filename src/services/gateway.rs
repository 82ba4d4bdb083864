//! Rate-limited, retrying, cache-through access to the market data provider.

use crate::cache::TtlCache;
use crate::metrics::Metrics;
use crate::models::{HistoryPeriod, HistoryResponse, Quote};
use crate::services::provider::{MarketDataProvider, ProviderError};
use crate::services::rate_limit::RateLimiter;
use backon::{ExponentialBuilder, Retryable};
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{debug, warn};

/// Quote and history results stay fresh for 15 minutes.
const CACHE_TTL: Duration = Duration::from_secs(900);
/// Minimum spacing between outbound provider calls.
const MIN_CALL_GAP: Duration = Duration::from_millis(200);
/// First backoff delay on a rate-limit error; doubles per retry.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(1000);
/// Retries after the initial attempt (3 attempts total).
const MAX_RETRIES: usize = 2;

pub struct MarketDataGateway {
    provider: Arc<dyn MarketDataProvider>,
    quotes: TtlCache<Quote>,
    history: TtlCache<HistoryResponse>,
    limiter: RateLimiter,
    metrics: Option<Arc<Metrics>>,
}

impl MarketDataGateway {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            provider,
            quotes: TtlCache::new(),
            history: TtlCache::new(),
            limiter: RateLimiter::new(MIN_CALL_GAP),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn record_cache(&self, hit: bool) {
        if let Some(ref metrics) = self.metrics {
            if hit {
                metrics.cache_hits_total.inc();
            } else {
                metrics.cache_misses_total.inc();
            }
        }
    }

    fn record_request(&self) {
        if let Some(ref metrics) = self.metrics {
            metrics.provider_requests_total.inc();
        }
    }

    fn backoff() -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(RETRY_BASE_DELAY)
            .with_factor(2.0)
            .with_max_times(MAX_RETRIES)
    }

    /// Live quote, served from cache when fresh.
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, ProviderError> {
        let symbol = symbol.to_uppercase();
        let key = format!("quote:{}", symbol);

        if let Some(quote) = self.quotes.get(&key).await {
            self.record_cache(true);
            debug!(symbol = %symbol, "Gateway: quote cache hit for {}", symbol);
            return Ok(quote);
        }
        self.record_cache(false);

        let quote = (|| async {
            self.limiter.acquire().await;
            self.record_request();
            self.provider.quote(&symbol).await
        })
        .retry(Self::backoff())
        .when(ProviderError::is_rate_limited)
        .notify(|err: &ProviderError, delay: std::time::Duration| {
            warn!(
                error = %err,
                delay_ms = delay.as_millis() as u64,
                "Gateway: rate limited, retrying in {}ms",
                delay.as_millis()
            );
        })
        .await?;

        self.quotes.set(&key, quote.clone(), CACHE_TTL).await;
        Ok(quote)
    }

    /// Historical bars for the period's date range, served from a
    /// period-keyed cache when fresh.
    pub async fn get_history(
        &self,
        symbol: &str,
        period: HistoryPeriod,
    ) -> Result<HistoryResponse, ProviderError> {
        let symbol = symbol.to_uppercase();
        let key = format!("history:{}:{}", symbol, period.as_str());

        if let Some(history) = self.history.get(&key).await {
            self.record_cache(true);
            debug!(
                symbol = %symbol,
                period = period.as_str(),
                "Gateway: history cache hit for {} ({})",
                symbol,
                period.as_str()
            );
            return Ok(history);
        }
        self.record_cache(false);

        let to = Utc::now().date_naive();
        let from = to - ChronoDuration::days(period.days());
        let interval = period.interval();

        let bars = (|| async {
            self.limiter.acquire().await;
            self.record_request();
            self.provider.historical(&symbol, from, to, interval).await
        })
        .retry(Self::backoff())
        .when(ProviderError::is_rate_limited)
        .notify(|err: &ProviderError, delay: std::time::Duration| {
            warn!(
                error = %err,
                delay_ms = delay.as_millis() as u64,
                "Gateway: rate limited, retrying in {}ms",
                delay.as_millis()
            );
        })
        .await?;

        let response = HistoryResponse {
            symbol: symbol.clone(),
            period,
            bars,
            fetched_at: Utc::now(),
        };

        self.history.set(&key, response.clone(), CACHE_TTL).await;
        Ok(response)
    }

    /// Drop the quote and every period-keyed history entry for a symbol,
    /// case-insensitively.
    pub async fn invalidate_cache(&self, symbol: &str) {
        let symbol = symbol.to_uppercase();
        self.quotes.delete(&format!("quote:{}", symbol)).await;
        self.history.delete_prefix(&format!("history:{}:", symbol)).await;
    }
}
