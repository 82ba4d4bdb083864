//! Unit tests for market sync progress milestones

use stockwatch::jobs::market_sync::progress_milestone;

#[test]
fn test_milestones_fire_once_on_non_divisible_total() {
    // 25 symbols: 10% crossed at 3, 50% at 13, 100% at 25.
    let fired: Vec<(usize, u64)> = (1..=25)
        .filter_map(|done| progress_milestone(done, 25).map(|pct| (done, pct)))
        .collect();
    assert_eq!(fired, vec![(3, 10), (13, 50), (25, 100)]);
}

#[test]
fn test_milestones_on_divisible_total() {
    let fired: Vec<(usize, u64)> = (1..=10)
        .filter_map(|done| progress_milestone(done, 10).map(|pct| (done, pct)))
        .collect();
    assert_eq!(fired, vec![(1, 10), (5, 50), (10, 100)]);
}

#[test]
fn test_single_symbol_sweep_hits_every_threshold_at_once() {
    // One step crosses 10, 50 and 100 together; the largest wins.
    assert_eq!(progress_milestone(1, 1), Some(100));
}

#[test]
fn test_out_of_range_inputs_yield_nothing() {
    assert_eq!(progress_milestone(0, 25), None);
    assert_eq!(progress_milestone(26, 25), None);
    assert_eq!(progress_milestone(1, 0), None);
}
