//! Unit tests for SMA and standard deviation

use stockwatch::indicators::trend::{sma, std_dev};

#[test]
fn test_sma_last_window() {
    let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
    assert_eq!(sma(&values, 3), Some(4.0));
}

#[test]
fn test_sma_full_length() {
    let values = vec![2.0, 4.0, 6.0];
    assert_eq!(sma(&values, 3), Some(4.0));
}

#[test]
fn test_sma_insufficient_data() {
    let values = vec![1.0, 2.0];
    assert!(sma(&values, 3).is_none());
}

#[test]
fn test_sma_zero_period() {
    assert!(sma(&[1.0, 2.0, 3.0], 0).is_none());
}

#[test]
fn test_std_dev_constant_series() {
    let values = vec![5.0; 10];
    assert_eq!(std_dev(&values, 10), Some(0.0));
}

#[test]
fn test_std_dev_known_value() {
    // Population std dev of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2.
    let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    let sd = std_dev(&values, 8).unwrap();
    assert!((sd - 2.0).abs() < 1e-10);
}

#[test]
fn test_std_dev_insufficient_data() {
    assert!(std_dev(&[1.0], 2).is_none());
}
