//! Alert rule and alert models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Strategy identifiers, used for deduplication keys and settings toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyKind {
    Pullback,
    Breakout,
    MacdCross,
    ScoreThreshold,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Pullback => "PULLBACK",
            StrategyKind::Breakout => "BREAKOUT",
            StrategyKind::MacdCross => "MACD_CROSS",
            StrategyKind::ScoreThreshold => "SCORE_THRESHOLD",
        }
    }
}

/// Per-strategy parameters with explicit defaults. Serialized with a
/// `strategy` tag so stored rules stay self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyParams {
    Pullback {
        /// Max distance of close from SMA50, as a fraction (0.02 = 2%).
        #[serde(default = "default_pullback_pct")]
        pullback_pct: f64,
        #[serde(default = "default_rsi_min")]
        rsi_min: f64,
        #[serde(default = "default_rsi_max")]
        rsi_max: f64,
    },
    Breakout {
        /// Bars scanned for the resistance level.
        #[serde(default = "default_lookback")]
        lookback: usize,
        /// Most-recent bars that must all close above resistance.
        #[serde(default = "default_confirm_bars")]
        confirm_bars: usize,
        /// Latest volume must reach avg20 times this factor.
        #[serde(default = "default_volume_threshold")]
        volume_threshold: f64,
    },
    MacdCross {
        #[serde(default)]
        min_histogram: f64,
        #[serde(default = "default_require_uptrend")]
        require_uptrend: bool,
    },
    ScoreThreshold {
        #[serde(default = "default_min_score")]
        min_score: f64,
    },
}

fn default_pullback_pct() -> f64 {
    0.02
}
fn default_rsi_min() -> f64 {
    40.0
}
fn default_rsi_max() -> f64 {
    50.0
}
fn default_lookback() -> usize {
    20
}
fn default_confirm_bars() -> usize {
    1
}
fn default_volume_threshold() -> f64 {
    1.5
}
fn default_require_uptrend() -> bool {
    true
}
fn default_min_score() -> f64 {
    80.0
}

impl StrategyParams {
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyParams::Pullback { .. } => StrategyKind::Pullback,
            StrategyParams::Breakout { .. } => StrategyKind::Breakout,
            StrategyParams::MacdCross { .. } => StrategyKind::MacdCross,
            StrategyParams::ScoreThreshold { .. } => StrategyKind::ScoreThreshold,
        }
    }

    pub fn pullback_defaults() -> Self {
        StrategyParams::Pullback {
            pullback_pct: default_pullback_pct(),
            rsi_min: default_rsi_min(),
            rsi_max: default_rsi_max(),
        }
    }

    pub fn breakout_defaults() -> Self {
        StrategyParams::Breakout {
            lookback: default_lookback(),
            confirm_bars: default_confirm_bars(),
            volume_threshold: default_volume_threshold(),
        }
    }

    pub fn macd_cross_defaults() -> Self {
        StrategyParams::MacdCross {
            min_histogram: 0.0,
            require_uptrend: default_require_uptrend(),
        }
    }

    pub fn score_threshold_defaults() -> Self {
        StrategyParams::ScoreThreshold {
            min_score: default_min_score(),
        }
    }
}

/// Configured alert strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: Option<i64>,
    pub params: StrategyParams,
    pub enabled: bool,
}

impl AlertRule {
    pub fn enabled_with(params: StrategyParams) -> Self {
        Self {
            id: None,
            params,
            enabled: true,
        }
    }

    pub fn kind(&self) -> StrategyKind {
        self.params.kind()
    }
}

/// A triggered alert. Immutable after creation except acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Option<i64>,
    pub symbol: String,
    pub strategy: StrategyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub message: String,
    pub triggered_at: DateTime<Utc>,
    pub acknowledged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn new(symbol: &str, strategy: StrategyKind, score: Option<f64>, message: String) -> Self {
        Self {
            id: None,
            symbol: symbol.to_string(),
            strategy,
            score,
            message,
            triggered_at: Utc::now(),
            acknowledged: false,
            acknowledged_at: None,
        }
    }
}
