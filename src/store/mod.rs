//! Narrow persistence contract consumed by the engine.
//!
//! The engine never touches schema or migration mechanics; it reads and
//! writes through this trait. Production runs use [`PgStore`], tests use
//! [`MemoryStore`].

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::models::{Alert, AlertRule, Bar, IndicatorSnapshot, Market, Stock, StrategyKind, UserSettings};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Insert-or-update bars by (symbol, date). Returns the number of rows
    /// written.
    async fn upsert_bars(&self, symbol: &str, bars: &[Bar]) -> Result<usize, BoxError>;

    /// Bars ordered ascending by date. With a limit, the *last* N bars.
    async fn bars_ascending(&self, symbol: &str, limit: Option<usize>)
        -> Result<Vec<Bar>, BoxError>;

    async fn bar_count(&self, symbol: &str) -> Result<usize, BoxError>;

    /// Dates already present for the symbol within [from, to].
    async fn existing_dates(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashSet<NaiveDate>, BoxError>;

    /// Rewrite the indicator fields of every given row in one transaction.
    /// The persisted composite score of a row is left untouched.
    async fn replace_snapshots(
        &self,
        symbol: &str,
        rows: &[IndicatorSnapshot],
    ) -> Result<(), BoxError>;

    async fn latest_snapshot(&self, symbol: &str)
        -> Result<Option<IndicatorSnapshot>, BoxError>;

    /// Write the composite score onto the latest indicator row.
    async fn write_score(&self, symbol: &str, score: f64) -> Result<(), BoxError>;

    /// Joined bar + indicator rows, newest first, at most `limit`.
    async fn history_desc(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<(Bar, IndicatorSnapshot)>, BoxError>;

    async fn active_stocks(&self, markets: &[Market]) -> Result<Vec<Stock>, BoxError>;

    async fn alert_rules(&self) -> Result<Vec<AlertRule>, BoxError>;

    /// Whether an alert for (symbol, strategy) was triggered after `since`.
    async fn recent_alert_exists(
        &self,
        symbol: &str,
        strategy: StrategyKind,
        since: DateTime<Utc>,
    ) -> Result<bool, BoxError>;

    async fn insert_alert(&self, alert: &Alert) -> Result<i64, BoxError>;

    async fn user_settings(&self) -> Result<UserSettings, BoxError>;
}
