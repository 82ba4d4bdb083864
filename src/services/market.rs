//! Market classification by ticker suffix and market-hours gating.

use crate::models::Market;
use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

const EU_SUFFIXES: [&str; 8] = [".PA", ".DE", ".L", ".AS", ".MI", ".MC", ".BR", ".SW"];

/// Classify a ticker by its suffix. Unknown suffixes default to US.
pub fn detect_market(symbol: &str) -> Market {
    let upper = symbol.to_uppercase();
    if EU_SUFFIXES.iter().any(|s| upper.ends_with(s)) {
        Market::Eu
    } else {
        Market::Us
    }
}

/// Human-readable exchange name for a ticker suffix.
pub fn exchange_name(symbol: &str) -> &'static str {
    let upper = symbol.to_uppercase();
    match upper.rsplit_once('.').map(|(_, suffix)| suffix) {
        Some("PA") => "Euronext Paris",
        Some("DE") => "XETRA",
        Some("L") => "London Stock Exchange",
        Some("AS") => "Euronext Amsterdam",
        Some("MI") => "Borsa Italiana",
        Some("MC") => "Bolsa de Madrid",
        Some("BR") => "Euronext Brussels",
        Some("SW") => "SIX Swiss Exchange",
        _ => "NYSE / NASDAQ",
    }
}

/// Session windows in UTC, Monday through Friday. Exchange-calendar
/// precision (holidays, DST shifts) is not needed for the gate's purpose of
/// skipping closed-market fetches.
pub struct MarketHours;

impl MarketHours {
    pub fn is_open(market: Market, now: DateTime<Utc>) -> bool {
        if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }

        let minutes = now.hour() * 60 + now.minute();
        match market {
            // 09:30-16:00 Eastern.
            Market::Us => (13 * 60 + 30..20 * 60).contains(&minutes),
            // 09:00-17:30 Central European.
            Market::Eu => (7 * 60..15 * 60 + 30).contains(&minutes),
        }
    }

    pub fn open_markets(now: DateTime<Utc>) -> Vec<Market> {
        [Market::Us, Market::Eu]
            .into_iter()
            .filter(|&m| Self::is_open(m, now))
            .collect()
    }
}
