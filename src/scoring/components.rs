//! The six weighted sub-scores of the composite opportunity score.
//!
//! Every raw score is clamped to [0, 100]; missing inputs fall back to a
//! neutral 50 instead of failing. The weights sum to 1.0.

use crate::models::ScoreComponent;

pub const WEIGHT_TREND_LONG: f64 = 0.25;
pub const WEIGHT_TREND_MEDIUM: f64 = 0.20;
pub const WEIGHT_MOMENTUM: f64 = 0.20;
pub const WEIGHT_VOLUME: f64 = 0.15;
pub const WEIGHT_SENTIMENT: f64 = 0.10;
pub const WEIGHT_SUPPORT: f64 = 0.10;

const NEUTRAL: f64 = 50.0;

/// Inputs to the composite score, assembled by the scoring engine from the
/// latest bar, its indicator row, a live news count and recent lows.
#[derive(Debug, Clone, Default)]
pub struct ScoreInput {
    pub price: f64,
    pub volume: f64,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd_hist: Option<f64>,
    pub avg_vol20: Option<f64>,
    pub news_count: usize,
    /// Lows of the most recent bars (typically 20), any order.
    pub lows: Vec<f64>,
}

fn clamp(value: f64) -> f64 {
    value.max(0.0).min(100.0)
}

/// Price vs SMA200, percentage distance mapped linearly over ±20%.
pub fn trend_long_score(price: f64, sma200: Option<f64>) -> f64 {
    match sma200 {
        Some(sma) if sma > 0.0 => {
            let pct = (price - sma) / sma * 100.0;
            clamp(NEUTRAL + pct * (50.0 / 20.0))
        }
        _ => NEUTRAL,
    }
}

/// 60% price-vs-SMA50 (±15% window) + 40% SMA20-vs-SMA50 crossover (±10%).
pub fn trend_medium_score(price: f64, sma20: Option<f64>, sma50: Option<f64>) -> f64 {
    let price_part = match sma50 {
        Some(sma) if sma > 0.0 => {
            let pct = (price - sma) / sma * 100.0;
            clamp(NEUTRAL + pct * (50.0 / 15.0))
        }
        _ => NEUTRAL,
    };

    let cross_part = match (sma20, sma50) {
        (Some(fast), Some(slow)) if slow > 0.0 => {
            let pct = (fast - slow) / slow * 100.0;
            clamp(NEUTRAL + pct * (50.0 / 10.0))
        }
        _ => NEUTRAL,
    };

    0.6 * price_part + 0.4 * cross_part
}

/// RSI shaped so the 40-60 band scores 70-100 (peaking at 50) and the
/// extremes taper toward 0.
pub fn rsi_shaped_score(rsi: f64) -> f64 {
    if (40.0..=60.0).contains(&rsi) {
        100.0 - (rsi - 50.0).abs() * 3.0
    } else if rsi < 40.0 {
        clamp(70.0 * (rsi / 40.0))
    } else {
        clamp(70.0 * ((100.0 - rsi) / 40.0))
    }
}

/// 50% shaped RSI + 50% MACD histogram mapped over [-2, +2].
pub fn momentum_score(rsi14: Option<f64>, macd_hist: Option<f64>) -> f64 {
    let rsi_part = rsi14.map(rsi_shaped_score).unwrap_or(NEUTRAL);
    let macd_part = macd_hist
        .map(|h| clamp(NEUTRAL + h * 25.0))
        .unwrap_or(NEUTRAL);
    0.5 * rsi_part + 0.5 * macd_part
}

/// Volume vs 20-day average, ratio mapped over [0, 2.0].
pub fn volume_score(volume: f64, avg_vol20: Option<f64>) -> f64 {
    match avg_vol20 {
        Some(avg) if avg > 0.0 => clamp(volume / avg * 50.0),
        _ => NEUTRAL,
    }
}

/// Step function on the recent news count.
pub fn sentiment_score(news_count: usize) -> f64 {
    match news_count {
        0 => 30.0,
        1..=3 => 50.0,
        4..=7 => 70.0,
        _ => 85.0,
    }
}

/// Distance of price above the minimum recent low, mapped over [0%, 15%]
/// onto [100, 20].
pub fn support_score(price: f64, lows: &[f64]) -> f64 {
    let min_low = lows.iter().cloned().fold(f64::INFINITY, f64::min);
    if !min_low.is_finite() || min_low <= 0.0 {
        return NEUTRAL;
    }

    let pct = (price - min_low) / min_low * 100.0;
    if pct <= 0.0 {
        return 100.0;
    }
    (100.0 - pct * (80.0 / 15.0)).max(20.0)
}

/// All six components. Weights sum to 1.0 and every raw score is in [0, 100].
pub fn compute_components(input: &ScoreInput) -> Vec<ScoreComponent> {
    vec![
        ScoreComponent::new(
            "trend_long",
            WEIGHT_TREND_LONG,
            trend_long_score(input.price, input.sma200),
        ),
        ScoreComponent::new(
            "trend_medium",
            WEIGHT_TREND_MEDIUM,
            trend_medium_score(input.price, input.sma20, input.sma50),
        ),
        ScoreComponent::new(
            "momentum",
            WEIGHT_MOMENTUM,
            momentum_score(input.rsi14, input.macd_hist),
        ),
        ScoreComponent::new(
            "volume",
            WEIGHT_VOLUME,
            volume_score(input.volume, input.avg_vol20),
        ),
        ScoreComponent::new(
            "sentiment",
            WEIGHT_SENTIMENT,
            sentiment_score(input.news_count),
        ),
        ScoreComponent::new(
            "support",
            WEIGHT_SUPPORT,
            support_score(input.price, &input.lows),
        ),
    ]
}

/// Rounded weighted sum of the component scores.
pub fn composite(components: &[ScoreComponent]) -> f64 {
    components
        .iter()
        .map(|c| c.weighted_score)
        .sum::<f64>()
        .round()
}
