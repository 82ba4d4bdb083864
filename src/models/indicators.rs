//! Per-bar indicator snapshot models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Derived indicator values stored alongside each bar. Every field is `None`
/// until enough history exists for its warm-up window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma20: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma200: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema9: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema21: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi14: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_line: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_signal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_hist: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bb_upper: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bb_middle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bb_lower: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obv: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_vol20: Option<f64>,
    /// Composite score written back by the scoring engine onto the latest row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl IndicatorSnapshot {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            ..Default::default()
        }
    }
}

/// What `IndicatorEngine` hands back to callers: the freshest snapshot plus
/// the on-demand volume ratio (never persisted) and a calculation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorReport {
    pub symbol: String,
    pub snapshot: IndicatorSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_ratio: Option<f64>,
    pub calculated_at: DateTime<Utc>,
}
