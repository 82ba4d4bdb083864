//! Composite score calculation and persistence.

use crate::models::CompositeScore;
use crate::scoring::components::{composite, compute_components, ScoreInput};
use crate::services::provider::MarketDataProvider;
use crate::store::{BoxError, Store};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

const SCORE_BARS: usize = 50;
const SUPPORT_LOOKBACK: usize = 20;

pub struct ScoringEngine {
    store: Arc<dyn Store>,
    provider: Arc<dyn MarketDataProvider>,
}

impl ScoringEngine {
    pub fn new(store: Arc<dyn Store>, provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { store, provider }
    }

    /// Compute the composite score from the latest indicator row, a live
    /// news count and recent lows; persist it onto the latest indicator row.
    /// Returns `None` when the symbol has no stored bars.
    pub async fn calculate_score(&self, symbol: &str) -> Result<Option<CompositeScore>, BoxError> {
        let bars = self.store.bars_ascending(symbol, Some(SCORE_BARS)).await?;
        let latest = match bars.last() {
            Some(bar) => bar.clone(),
            None => return Ok(None),
        };

        let snapshot = self.store.latest_snapshot(symbol).await?.unwrap_or_default();

        // A failed news lookup scores as zero recent news rather than
        // aborting the calculation.
        let news_count = match self.provider.news_count(symbol).await {
            Ok(count) => count,
            Err(e) => {
                debug!(symbol = %symbol, error = %e, "News lookup failed, treating as 0");
                0
            }
        };

        let lows: Vec<f64> = bars
            .iter()
            .rev()
            .take(SUPPORT_LOOKBACK)
            .map(|b| b.low)
            .collect();

        let input = ScoreInput {
            price: latest.close,
            volume: latest.volume,
            sma20: snapshot.sma20,
            sma50: snapshot.sma50,
            sma200: snapshot.sma200,
            rsi14: snapshot.rsi14,
            macd_hist: snapshot.macd_hist,
            avg_vol20: snapshot.avg_vol20,
            news_count,
            lows,
        };

        let components = compute_components(&input);
        let score = composite(&components);

        self.store.write_score(symbol, score).await?;

        debug!(
            symbol = %symbol,
            score = score,
            "ScoringEngine: scored {} at {}",
            symbol,
            score
        );

        Ok(Some(CompositeScore {
            symbol: symbol.to_uppercase(),
            score,
            components,
            calculated_at: Utc::now(),
        }))
    }
}
