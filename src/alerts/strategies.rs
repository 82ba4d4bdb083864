//! Strategy condition detection over a symbol's indicator history.
//!
//! All functions take rows ordered newest-first (row 0 = latest bar) and
//! return plain booleans. A condition whose required indicator inputs are
//! missing is false, never an error.

use crate::models::{Bar, IndicatorSnapshot, StrategyParams};

pub type HistoryRow = (Bar, IndicatorSnapshot);

/// Dispatch a parameter set to its detection function.
pub fn matches(params: &StrategyParams, rows: &[HistoryRow]) -> bool {
    match params {
        StrategyParams::Pullback {
            pullback_pct,
            rsi_min,
            rsi_max,
        } => pullback(rows, *pullback_pct, *rsi_min, *rsi_max),
        StrategyParams::Breakout {
            lookback,
            confirm_bars,
            volume_threshold,
        } => breakout(rows, *lookback, *confirm_bars, *volume_threshold),
        StrategyParams::MacdCross {
            min_histogram,
            require_uptrend,
        } => macd_cross(rows, *min_histogram, *require_uptrend),
        StrategyParams::ScoreThreshold { min_score } => score_threshold(rows, *min_score),
    }
}

/// Uptrending stock resting on its SMA50: close above SMA200, close within
/// `pullback_pct` of SMA50, RSI inside [rsi_min, rsi_max], and volume below
/// both the 20-day average and the previous bar's volume.
pub fn pullback(rows: &[HistoryRow], pullback_pct: f64, rsi_min: f64, rsi_max: f64) -> bool {
    let [(bar, snap), (prev_bar, _), ..] = rows else {
        return false;
    };

    let (Some(sma200), Some(sma50), Some(rsi), Some(avg_vol)) =
        (snap.sma200, snap.sma50, snap.rsi14, snap.avg_vol20)
    else {
        return false;
    };

    if sma50 <= 0.0 {
        return false;
    }

    bar.close > sma200
        && ((bar.close - sma50) / sma50).abs() <= pullback_pct
        && rsi >= rsi_min
        && rsi <= rsi_max
        && bar.volume < avg_vol
        && bar.volume < prev_bar.volume
}

/// Close above the lookback-window resistance on every confirmation bar,
/// with the latest volume at or above `volume_threshold` times the 20-day
/// average. The resistance window excludes the confirmation bars.
pub fn breakout(rows: &[HistoryRow], lookback: usize, confirm_bars: usize, volume_threshold: f64) -> bool {
    if confirm_bars == 0 || rows.len() < confirm_bars + 1 {
        return false;
    }

    let window = &rows[confirm_bars..(confirm_bars + lookback).min(rows.len())];
    let resistance = window
        .iter()
        .map(|(bar, _)| bar.high)
        .fold(f64::NEG_INFINITY, f64::max);
    if !resistance.is_finite() {
        return false;
    }

    if !rows[..confirm_bars].iter().all(|(bar, _)| bar.close > resistance) {
        return false;
    }

    let (latest_bar, latest_snap) = &rows[0];
    match latest_snap.avg_vol20 {
        Some(avg) => latest_bar.volume >= avg * volume_threshold,
        None => false,
    }
}

/// Bullish MACD crossover between the previous and latest bar, with the
/// histogram flipping from non-positive past `min_histogram`, optionally
/// gated on close > SMA50.
pub fn macd_cross(rows: &[HistoryRow], min_histogram: f64, require_uptrend: bool) -> bool {
    let [(bar, snap), (_, prev_snap), ..] = rows else {
        return false;
    };

    let (Some(line), Some(signal), Some(hist)) = (snap.macd_line, snap.macd_signal, snap.macd_hist)
    else {
        return false;
    };
    let (Some(prev_line), Some(prev_signal), Some(prev_hist)) =
        (prev_snap.macd_line, prev_snap.macd_signal, prev_snap.macd_hist)
    else {
        return false;
    };

    let crossed = prev_line <= prev_signal && line > signal;
    let histogram_ok = hist >= min_histogram && prev_hist <= 0.0;

    let trend_ok = if require_uptrend {
        match snap.sma50 {
            Some(sma50) => bar.close > sma50,
            None => return false,
        }
    } else {
        true
    };

    crossed && histogram_ok && trend_ok
}

/// Latest persisted composite score at or above the threshold.
pub fn score_threshold(rows: &[HistoryRow], min_score: f64) -> bool {
    rows.first()
        .and_then(|(_, snap)| snap.score)
        .map(|score| score >= min_score)
        .unwrap_or(false)
}
