//! Unit tests for MACD indicator

use stockwatch::indicators::momentum::{macd, macd_default};

fn wave(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| 100.0 + (i as f64 * 0.3).sin() * 4.0 + i as f64 * 0.1)
        .collect()
}

#[test]
fn test_macd_insufficient_data() {
    // Default 12/26/9 needs 26 + 9 - 1 = 34 prices.
    let prices = wave(33);
    assert!(macd_default(&prices).is_none());
}

#[test]
fn test_macd_minimum_data() {
    let prices = wave(34);
    assert!(macd_default(&prices).is_some());
}

#[test]
fn test_macd_histogram_identity() {
    let prices = wave(120);
    let m = macd_default(&prices).unwrap();
    assert!((m.histogram - (m.line - m.signal)).abs() < 1e-10);
}

#[test]
fn test_macd_rejects_fast_not_below_slow() {
    let prices = wave(120);
    assert!(macd(&prices, 26, 26, 9).is_none());
    assert!(macd(&prices, 30, 26, 9).is_none());
}

#[test]
fn test_macd_positive_in_uptrend() {
    // Accelerating rise keeps the fast EMA above the slow one.
    let prices: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64).powf(1.3) * 0.2).collect();
    let m = macd_default(&prices).unwrap();
    assert!(m.line > 0.0);
}

#[test]
fn test_macd_zero_on_constant_prices() {
    let prices = vec![50.0; 60];
    let m = macd_default(&prices).unwrap();
    assert!(m.line.abs() < 1e-10);
    assert!(m.signal.abs() < 1e-10);
    assert!(m.histogram.abs() < 1e-10);
}
