//! Bollinger Bands indicator

use crate::indicators::trend::sma::{sma, std_dev};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Middle band = SMA(period), upper/lower = middle ± k * population σ over
/// the same window.
pub fn bollinger_bands(prices: &[f64], period: usize, k: f64) -> Option<BollingerBands> {
    let middle = sma(prices, period)?;
    let sigma = std_dev(prices, period)?;

    Some(BollingerBands {
        upper: middle + k * sigma,
        middle,
        lower: middle - k * sigma,
    })
}

/// Bollinger Bands with default parameters (20 SMA, 2σ).
pub fn bollinger_bands_default(prices: &[f64]) -> Option<BollingerBands> {
    bollinger_bands(prices, 20, 2.0)
}
