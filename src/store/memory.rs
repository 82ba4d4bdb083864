//! In-memory store used by tests and offline runs.

use crate::models::{Alert, AlertRule, Bar, IndicatorSnapshot, Market, Stock, StrategyKind, UserSettings};
use crate::store::{BoxError, Store};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    bars: HashMap<String, BTreeMap<NaiveDate, Bar>>,
    snapshots: HashMap<String, BTreeMap<NaiveDate, IndicatorSnapshot>>,
    stocks: Vec<Stock>,
    rules: Vec<AlertRule>,
    alerts: Vec<Alert>,
    settings: UserSettings,
    next_alert_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_stock(&self, stock: Stock) {
        self.inner.write().await.stocks.push(stock);
    }

    pub async fn add_rule(&self, rule: AlertRule) {
        self.inner.write().await.rules.push(rule);
    }

    pub async fn set_settings(&self, settings: UserSettings) {
        self.inner.write().await.settings = settings;
    }

    /// All stored alerts, oldest first. Test helper; the surrounding system
    /// reads alerts through its own surface.
    pub async fn alerts(&self) -> Vec<Alert> {
        self.inner.read().await.alerts.clone()
    }
}

fn key(symbol: &str) -> String {
    symbol.to_uppercase()
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_bars(&self, symbol: &str, bars: &[Bar]) -> Result<usize, BoxError> {
        let mut inner = self.inner.write().await;
        let by_date = inner.bars.entry(key(symbol)).or_default();
        for bar in bars {
            by_date.insert(bar.date, bar.clone());
        }
        Ok(bars.len())
    }

    async fn bars_ascending(
        &self,
        symbol: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Bar>, BoxError> {
        let inner = self.inner.read().await;
        let all: Vec<Bar> = inner
            .bars
            .get(&key(symbol))
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default();

        match limit {
            Some(n) if all.len() > n => Ok(all[all.len() - n..].to_vec()),
            _ => Ok(all),
        }
    }

    async fn bar_count(&self, symbol: &str) -> Result<usize, BoxError> {
        let inner = self.inner.read().await;
        Ok(inner.bars.get(&key(symbol)).map(|m| m.len()).unwrap_or(0))
    }

    async fn existing_dates(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashSet<NaiveDate>, BoxError> {
        let inner = self.inner.read().await;
        Ok(inner
            .bars
            .get(&key(symbol))
            .map(|m| m.range(from..=to).map(|(d, _)| *d).collect())
            .unwrap_or_default())
    }

    async fn replace_snapshots(
        &self,
        symbol: &str,
        rows: &[IndicatorSnapshot],
    ) -> Result<(), BoxError> {
        let mut inner = self.inner.write().await;
        let by_date = inner.snapshots.entry(key(symbol)).or_default();
        for row in rows {
            let score = by_date.get(&row.date).and_then(|prev| prev.score);
            let mut next = row.clone();
            next.score = score;
            by_date.insert(next.date, next);
        }
        Ok(())
    }

    async fn latest_snapshot(
        &self,
        symbol: &str,
    ) -> Result<Option<IndicatorSnapshot>, BoxError> {
        let inner = self.inner.read().await;
        Ok(inner
            .snapshots
            .get(&key(symbol))
            .and_then(|m| m.values().next_back().cloned()))
    }

    async fn write_score(&self, symbol: &str, score: f64) -> Result<(), BoxError> {
        let mut inner = self.inner.write().await;
        if let Some(by_date) = inner.snapshots.get_mut(&key(symbol)) {
            if let Some(latest) = by_date.values_mut().next_back() {
                latest.score = Some(score);
            }
        }
        Ok(())
    }

    async fn history_desc(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<(Bar, IndicatorSnapshot)>, BoxError> {
        let inner = self.inner.read().await;
        let symbol = key(symbol);
        let bars = match inner.bars.get(&symbol) {
            Some(b) => b,
            None => return Ok(Vec::new()),
        };
        let snapshots = inner.snapshots.get(&symbol);

        Ok(bars
            .iter()
            .rev()
            .take(limit)
            .map(|(date, bar)| {
                let snap = snapshots
                    .and_then(|m| m.get(date).cloned())
                    .unwrap_or_else(|| IndicatorSnapshot::empty(*date));
                (bar.clone(), snap)
            })
            .collect())
    }

    async fn active_stocks(&self, markets: &[Market]) -> Result<Vec<Stock>, BoxError> {
        let inner = self.inner.read().await;
        Ok(inner
            .stocks
            .iter()
            .filter(|s| s.active && markets.contains(&s.market))
            .cloned()
            .collect())
    }

    async fn alert_rules(&self) -> Result<Vec<AlertRule>, BoxError> {
        Ok(self.inner.read().await.rules.clone())
    }

    async fn recent_alert_exists(
        &self,
        symbol: &str,
        strategy: StrategyKind,
        since: DateTime<Utc>,
    ) -> Result<bool, BoxError> {
        let inner = self.inner.read().await;
        let symbol = key(symbol);
        Ok(inner
            .alerts
            .iter()
            .any(|a| a.symbol == symbol && a.strategy == strategy && a.triggered_at > since))
    }

    async fn insert_alert(&self, alert: &Alert) -> Result<i64, BoxError> {
        let mut inner = self.inner.write().await;
        inner.next_alert_id += 1;
        let id = inner.next_alert_id;
        let mut stored = alert.clone();
        stored.id = Some(id);
        stored.symbol = key(&stored.symbol);
        inner.alerts.push(stored);
        Ok(id)
    }

    async fn user_settings(&self) -> Result<UserSettings, BoxError> {
        Ok(self.inner.read().await.settings.clone())
    }
}
