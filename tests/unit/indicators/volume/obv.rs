//! Unit tests for OBV and average volume

use stockwatch::indicators::volume::{average_volume, obv, obv_series};

#[test]
fn test_obv_starts_at_zero() {
    assert_eq!(obv(&[100.0], &[5000.0]), Some(0.0));
}

#[test]
fn test_obv_accumulates_by_direction() {
    let prices = vec![10.0, 12.0, 11.0, 13.0];
    let volumes = vec![1000.0, 2000.0, 1500.0, 2500.0];
    // 0 + 2000 (up) - 1500 (down) + 2500 (up)
    assert_eq!(obv(&prices, &volumes), Some(3000.0));
}

#[test]
fn test_obv_flat_close_unchanged() {
    let prices = vec![10.0, 11.0, 11.0];
    let volumes = vec![1000.0, 2000.0, 9999.0];
    assert_eq!(obv(&prices, &volumes), Some(2000.0));
}

#[test]
fn test_obv_series_length_matches_input() {
    let prices = vec![10.0, 11.0, 10.5, 10.5];
    let volumes = vec![100.0, 200.0, 300.0, 400.0];
    let series = obv_series(&prices, &volumes);
    assert_eq!(series, vec![0.0, 200.0, -100.0, -100.0]);
}

#[test]
fn test_obv_mismatched_lengths() {
    assert!(obv(&[10.0, 11.0], &[100.0]).is_none());
    assert!(obv_series(&[], &[]).is_empty());
}

#[test]
fn test_average_volume_ratio() {
    let volumes = vec![1000.0, 1000.0, 1000.0, 2000.0];
    let av = average_volume(&volumes, 4).unwrap();
    assert_eq!(av.average, 1250.0);
    assert_eq!(av.ratio, 1.6);
}

#[test]
fn test_average_volume_zero_average() {
    let volumes = vec![0.0; 20];
    let av = average_volume(&volumes, 20).unwrap();
    assert_eq!(av.average, 0.0);
    assert_eq!(av.ratio, 0.0);
}

#[test]
fn test_average_volume_insufficient_data() {
    assert!(average_volume(&[100.0; 5], 20).is_none());
}
