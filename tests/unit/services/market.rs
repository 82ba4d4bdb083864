//! Unit tests for market detection and session hours

use chrono::{TimeZone, Utc};
use stockwatch::models::Market;
use stockwatch::services::{detect_market, exchange_name, MarketHours};

#[test]
fn test_detect_market_by_suffix() {
    assert_eq!(detect_market("AAPL"), Market::Us);
    assert_eq!(detect_market("AIR.PA"), Market::Eu);
    assert_eq!(detect_market("SAP.DE"), Market::Eu);
    assert_eq!(detect_market("VOD.L"), Market::Eu);
    assert_eq!(detect_market("asml.as"), Market::Eu);
    // Unknown suffixes default to US.
    assert_eq!(detect_market("0700.HK"), Market::Us);
}

#[test]
fn test_exchange_names() {
    assert_eq!(exchange_name("AIR.PA"), "Euronext Paris");
    assert_eq!(exchange_name("SAP.DE"), "XETRA");
    assert_eq!(exchange_name("VOD.L"), "London Stock Exchange");
    assert_eq!(exchange_name("AAPL"), "NYSE / NASDAQ");
}

#[test]
fn test_us_session_window() {
    // 2026-08-24 is a Monday.
    let before = Utc.with_ymd_and_hms(2026, 8, 24, 13, 0, 0).unwrap();
    let open = Utc.with_ymd_and_hms(2026, 8, 24, 14, 0, 0).unwrap();
    let close = Utc.with_ymd_and_hms(2026, 8, 24, 20, 0, 0).unwrap();

    assert!(!MarketHours::is_open(Market::Us, before));
    assert!(MarketHours::is_open(Market::Us, open));
    assert!(!MarketHours::is_open(Market::Us, close));
}

#[test]
fn test_eu_session_window() {
    let open = Utc.with_ymd_and_hms(2026, 8, 24, 8, 0, 0).unwrap();
    let after = Utc.with_ymd_and_hms(2026, 8, 24, 16, 0, 0).unwrap();

    assert!(MarketHours::is_open(Market::Eu, open));
    assert!(!MarketHours::is_open(Market::Eu, after));
}

#[test]
fn test_weekend_always_closed() {
    // 2026-08-22 is a Saturday.
    let saturday = Utc.with_ymd_and_hms(2026, 8, 22, 14, 0, 0).unwrap();
    assert!(!MarketHours::is_open(Market::Us, saturday));
    assert!(!MarketHours::is_open(Market::Eu, saturday));
    assert!(MarketHours::open_markets(saturday).is_empty());
}

#[test]
fn test_overlapping_sessions() {
    // Early US afternoon UTC, both sessions running.
    let overlap = Utc.with_ymd_and_hms(2026, 8, 24, 14, 30, 0).unwrap();
    let open = MarketHours::open_markets(overlap);
    assert_eq!(open, vec![Market::Us, Market::Eu]);
}
