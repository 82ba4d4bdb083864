//! MACD (Moving Average Convergence Divergence) indicator

use crate::indicators::trend::ema_series;
use serde::{Deserialize, Serialize};

/// Latest MACD triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD line = EMA(fast) - EMA(slow), aligned by source index; signal line =
/// EMA(`signal_period`) of the MACD-line series; histogram = line - signal.
/// Needs at least `slow + signal_period - 1` prices.
pub fn macd(prices: &[f64], fast: usize, slow: usize, signal_period: usize) -> Option<Macd> {
    if fast == 0 || slow == 0 || signal_period == 0 || fast >= slow {
        return None;
    }
    if prices.len() < slow + signal_period - 1 {
        return None;
    }

    let fast_series = ema_series(prices, fast);
    let slow_series = ema_series(prices, slow);

    // Both series end at the last price index; the slow one starts later, so
    // align the fast series against the slow start.
    let offset = slow - fast;
    let line_series: Vec<f64> = slow_series
        .iter()
        .enumerate()
        .map(|(j, &(_, slow_val))| fast_series[j + offset].1 - slow_val)
        .collect();

    let signal_series = ema_series(&line_series, signal_period);

    let line = *line_series.last()?;
    let signal = signal_series.last().map(|&(_, v)| v)?;

    Some(Macd {
        line,
        signal,
        histogram: line - signal,
    })
}

/// MACD with the default 12/26/9 parameters.
pub fn macd_default(prices: &[f64]) -> Option<Macd> {
    macd(prices, 12, 26, 9)
}
