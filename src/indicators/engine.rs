//! Store-backed indicator computation and persistence.

use crate::indicators::momentum::{macd_default, rsi_default};
use crate::indicators::trend::{ema, sma};
use crate::indicators::volatility::bollinger_bands_default;
use crate::indicators::volume::{average_volume, obv};
use crate::models::{Bar, IndicatorReport, IndicatorSnapshot};
use crate::store::{BoxError, Store};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

pub struct IndicatorEngine {
    store: Arc<dyn Store>,
}

impl IndicatorEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Recompute indicators for every historical bar of a symbol and persist
    /// the rows in one transaction. Returns the freshest snapshot, or `None`
    /// when the symbol has no bars at all.
    ///
    /// Each row is computed over the prefix ending at that row, so a history
    /// query reads consistent values without recomputation. The full-history
    /// rewrite is quadratic in bar count; it is private to this engine so a
    /// windowed strategy can replace it behind the same signature.
    pub async fn compute_indicators(
        &self,
        symbol: &str,
    ) -> Result<Option<IndicatorReport>, BoxError> {
        let bars = self.store.bars_ascending(symbol, None).await?;
        if bars.is_empty() {
            return Ok(None);
        }

        let rows = Self::recompute_rows(&bars);
        self.store.replace_snapshots(symbol, &rows).await?;

        debug!(
            symbol = %symbol,
            rows = rows.len(),
            "IndicatorEngine: rewrote {} indicator rows for {}",
            rows.len(),
            symbol
        );

        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        let volume_ratio = average_volume(&volumes, 20).map(|a| a.ratio);

        let snapshot = match rows.last() {
            Some(row) => row.clone(),
            None => return Ok(None),
        };

        Ok(Some(IndicatorReport {
            symbol: symbol.to_uppercase(),
            snapshot,
            volume_ratio,
            calculated_at: Utc::now(),
        }))
    }

    /// Latest persisted row, without recomputation. The report's
    /// `volume_ratio` is always `None` here: that value is derived on
    /// demand, never stored.
    pub async fn get_indicators(&self, symbol: &str) -> Result<Option<IndicatorReport>, BoxError> {
        let snapshot = match self.store.latest_snapshot(symbol).await? {
            Some(s) => s,
            None => return Ok(None),
        };

        Ok(Some(IndicatorReport {
            symbol: symbol.to_uppercase(),
            snapshot,
            volume_ratio: None,
            calculated_at: Utc::now(),
        }))
    }

    fn recompute_rows(bars: &[Bar]) -> Vec<IndicatorSnapshot> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

        (0..bars.len())
            .map(|i| Self::row_at(bars, &closes, &volumes, i))
            .collect()
    }

    fn row_at(bars: &[Bar], closes: &[f64], volumes: &[f64], i: usize) -> IndicatorSnapshot {
        let closes = &closes[..=i];
        let volumes = &volumes[..=i];
        let macd = macd_default(closes);
        let bands = bollinger_bands_default(closes);

        IndicatorSnapshot {
            date: bars[i].date,
            sma20: sma(closes, 20),
            sma50: sma(closes, 50),
            sma200: sma(closes, 200),
            ema9: ema(closes, 9),
            ema21: ema(closes, 21),
            rsi14: rsi_default(closes),
            macd_line: macd.map(|m| m.line),
            macd_signal: macd.map(|m| m.signal),
            macd_hist: macd.map(|m| m.histogram),
            bb_upper: bands.map(|b| b.upper),
            bb_middle: bands.map(|b| b.middle),
            bb_lower: bands.map(|b| b.lower),
            obv: obv(closes, volumes),
            avg_vol20: average_volume(volumes, 20).map(|a| a.average),
            score: None,
        }
    }
}
