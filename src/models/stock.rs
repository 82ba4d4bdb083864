//! Tracked stock metadata

use serde::{Deserialize, Serialize};

/// Listing market, derived from the ticker suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    Us,
    Eu,
}

impl Market {
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Us => "US",
            Market::Eu => "EU",
        }
    }
}

/// A symbol tracked by the sync pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub market: Market,
    pub active: bool,
}

impl Stock {
    pub fn active(symbol: &str, market: Market) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: None,
            market,
            active: true,
        }
    }
}
