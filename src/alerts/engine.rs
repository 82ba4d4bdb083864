//! Rule evaluation over every active stock, with per-strategy dedup and
//! user-settings gating.

use crate::alerts::strategies::{self, HistoryRow};
use crate::models::{Alert, AlertRule, Market, StrategyParams, UserSettings};
use crate::scoring::ScoringEngine;
use crate::store::{BoxError, Store};
use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Bars of joined history loaded per symbol. Covers the longest strategy
/// lookback with room to spare.
const HISTORY_BARS: usize = 250;
/// No repeat alert for the same (symbol, strategy) inside this window.
const DEDUP_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Default, Clone, Serialize)]
pub struct AlertSummary {
    pub evaluated_stocks: usize,
    pub evaluated_rules: usize,
    pub created_alerts: usize,
    pub skipped_duplicates: usize,
    pub skipped_by_settings: usize,
}

pub struct AlertEngine {
    store: Arc<dyn Store>,
    scoring: Arc<ScoringEngine>,
}

impl AlertEngine {
    pub fn new(store: Arc<dyn Store>, scoring: Arc<ScoringEngine>) -> Self {
        Self { store, scoring }
    }

    /// Run every enabled rule against every active stock. One failing
    /// symbol never aborts the sweep.
    pub async fn evaluate_all(&self) -> Result<AlertSummary, BoxError> {
        let settings = self.store.user_settings().await?;
        let rules = self.store.alert_rules().await?;
        let stocks = self.store.active_stocks(&[Market::Us, Market::Eu]).await?;

        let mut summary = AlertSummary::default();

        for stock in &stocks {
            summary.evaluated_stocks += 1;
            if let Err(e) = self
                .evaluate_symbol(&stock.symbol, &rules, &settings, &mut summary)
                .await
            {
                error!(
                    symbol = %stock.symbol,
                    error = %e,
                    "AlertEngine: evaluation failed for {}",
                    stock.symbol
                );
            }
        }

        info!(
            evaluated_stocks = summary.evaluated_stocks,
            evaluated_rules = summary.evaluated_rules,
            created_alerts = summary.created_alerts,
            skipped_duplicates = summary.skipped_duplicates,
            skipped_by_settings = summary.skipped_by_settings,
            "AlertEngine: sweep complete, {} alerts created",
            summary.created_alerts
        );

        Ok(summary)
    }

    async fn evaluate_symbol(
        &self,
        symbol: &str,
        rules: &[AlertRule],
        settings: &UserSettings,
        summary: &mut AlertSummary,
    ) -> Result<(), BoxError> {
        let rows = self.store.history_desc(symbol, HISTORY_BARS).await?;
        if rows.is_empty() {
            return Ok(());
        }

        for rule in rules {
            if !rule.enabled {
                continue;
            }

            let kind = rule.kind();
            if !settings.strategy_enabled(kind) {
                summary.skipped_by_settings += 1;
                continue;
            }

            summary.evaluated_rules += 1;

            // Dedup before evaluating: a recent alert suppresses the rule
            // outright, no condition check needed.
            let since = Utc::now() - Duration::hours(DEDUP_WINDOW_HOURS);
            if self.store.recent_alert_exists(symbol, kind, since).await? {
                summary.skipped_duplicates += 1;
                continue;
            }

            if !strategies::matches(&rule.params, &rows) {
                continue;
            }

            let score = self.resolve_score(symbol, &rows).await?;
            if let Some(s) = score {
                if s < settings.min_alert_score {
                    summary.skipped_by_settings += 1;
                    continue;
                }
            }

            let message = build_message(symbol, &rule.params, &rows);
            let alert = Alert::new(symbol, kind, score, message);
            let id = self.store.insert_alert(&alert).await?;

            summary.created_alerts += 1;
            info!(
                symbol = %symbol,
                strategy = kind.as_str(),
                alert_id = id,
                score = ?score,
                "AlertEngine: {} alert created for {}",
                kind.as_str(),
                symbol
            );
        }

        Ok(())
    }

    /// Stored score of the latest row when present, otherwise a fresh
    /// calculation.
    async fn resolve_score(
        &self,
        symbol: &str,
        rows: &[HistoryRow],
    ) -> Result<Option<f64>, BoxError> {
        if let Some(score) = rows.first().and_then(|(_, snap)| snap.score) {
            return Ok(Some(score));
        }
        let computed = self.scoring.calculate_score(symbol).await?;
        Ok(computed.map(|c| c.score))
    }
}

fn build_message(symbol: &str, params: &StrategyParams, rows: &[HistoryRow]) -> String {
    let (bar, snap) = &rows[0];
    match params {
        StrategyParams::Pullback { .. } => format!(
            "{} pulled back to SMA50 ({:.2} vs {:.2}), RSI {:.1}",
            symbol,
            bar.close,
            snap.sma50.unwrap_or(0.0),
            snap.rsi14.unwrap_or(0.0)
        ),
        StrategyParams::Breakout { lookback, .. } => {
            let resistance = rows
                .iter()
                .skip(1)
                .take(*lookback)
                .map(|(b, _)| b.high)
                .fold(f64::NEG_INFINITY, f64::max);
            format!(
                "{} closed at {:.2}, above {}-bar resistance {:.2}",
                symbol, bar.close, lookback, resistance
            )
        }
        StrategyParams::MacdCross { .. } => format!(
            "{} MACD crossed above signal ({:.3} > {:.3})",
            symbol,
            snap.macd_line.unwrap_or(0.0),
            snap.macd_signal.unwrap_or(0.0)
        ),
        StrategyParams::ScoreThreshold { min_score } => format!(
            "{} opportunity score {:.0} reached threshold {:.0}",
            symbol,
            snap.score.unwrap_or(0.0),
            min_score
        ),
    }
}
