//! Postgres-backed store for bars, indicator rows, alerts and settings.

use crate::config;
use crate::models::{Alert, AlertRule, Bar, IndicatorSnapshot, Market, Stock, StrategyKind, StrategyParams, UserSettings};
use crate::store::{BoxError, Store};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use tokio::sync::Mutex;
use tokio_postgres::{Client, NoTls};

pub struct PgStore {
    // Mutex rather than RwLock: transactions need exclusive client access.
    client: Mutex<Client>,
}

fn db_err(context: &str, e: impl std::fmt::Display) -> BoxError {
    Box::new(std::io::Error::other(format!("{}: {}", context, e)))
}

impl PgStore {
    pub async fn connect() -> Result<Self, BoxError> {
        let url = config::get_database_url();
        let (client, connection) = tokio_postgres::connect(&url, NoTls)
            .await
            .map_err(|e| db_err("Failed to connect to Postgres", e))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "Postgres connection error");
            }
        });

        let store = Self {
            client: Mutex::new(client),
        };
        store.init_schema().await?;

        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), BoxError> {
        let client = self.client.lock().await;

        // Bars carry their indicator snapshot so history queries never
        // recompute. Unique per (symbol, date).
        client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS bars (
                    symbol TEXT NOT NULL,
                    date DATE NOT NULL,
                    open DOUBLE PRECISION NOT NULL,
                    high DOUBLE PRECISION NOT NULL,
                    low DOUBLE PRECISION NOT NULL,
                    close DOUBLE PRECISION NOT NULL,
                    volume DOUBLE PRECISION NOT NULL,
                    sma20 DOUBLE PRECISION,
                    sma50 DOUBLE PRECISION,
                    sma200 DOUBLE PRECISION,
                    ema9 DOUBLE PRECISION,
                    ema21 DOUBLE PRECISION,
                    rsi14 DOUBLE PRECISION,
                    macd_line DOUBLE PRECISION,
                    macd_signal DOUBLE PRECISION,
                    macd_hist DOUBLE PRECISION,
                    bb_upper DOUBLE PRECISION,
                    bb_middle DOUBLE PRECISION,
                    bb_lower DOUBLE PRECISION,
                    obv DOUBLE PRECISION,
                    avg_vol20 DOUBLE PRECISION,
                    score DOUBLE PRECISION,
                    PRIMARY KEY (symbol, date)
                );
                CREATE TABLE IF NOT EXISTS stocks (
                    symbol TEXT PRIMARY KEY,
                    name TEXT,
                    market TEXT NOT NULL,
                    active BOOLEAN NOT NULL DEFAULT TRUE
                );
                CREATE TABLE IF NOT EXISTS alert_rules (
                    id BIGSERIAL PRIMARY KEY,
                    params_json TEXT NOT NULL,
                    enabled BOOLEAN NOT NULL DEFAULT TRUE
                );
                CREATE TABLE IF NOT EXISTS alerts (
                    id BIGSERIAL PRIMARY KEY,
                    symbol TEXT NOT NULL,
                    strategy TEXT NOT NULL,
                    score DOUBLE PRECISION,
                    message TEXT NOT NULL,
                    triggered_at TIMESTAMPTZ NOT NULL,
                    acknowledged BOOLEAN NOT NULL DEFAULT FALSE,
                    acknowledged_at TIMESTAMPTZ
                );
                CREATE TABLE IF NOT EXISTS user_settings (
                    id SMALLINT PRIMARY KEY,
                    settings_json TEXT NOT NULL
                );",
            )
            .await
            .map_err(|e| db_err("Failed to initialize schema", e))?;

        Ok(())
    }
}

fn bar_from_row(row: &tokio_postgres::Row) -> Bar {
    Bar {
        date: row.get("date"),
        open: row.get("open"),
        high: row.get("high"),
        low: row.get("low"),
        close: row.get("close"),
        volume: row.get("volume"),
    }
}

fn snapshot_from_row(row: &tokio_postgres::Row) -> IndicatorSnapshot {
    IndicatorSnapshot {
        date: row.get("date"),
        sma20: row.get("sma20"),
        sma50: row.get("sma50"),
        sma200: row.get("sma200"),
        ema9: row.get("ema9"),
        ema21: row.get("ema21"),
        rsi14: row.get("rsi14"),
        macd_line: row.get("macd_line"),
        macd_signal: row.get("macd_signal"),
        macd_hist: row.get("macd_hist"),
        bb_upper: row.get("bb_upper"),
        bb_middle: row.get("bb_middle"),
        bb_lower: row.get("bb_lower"),
        obv: row.get("obv"),
        avg_vol20: row.get("avg_vol20"),
        score: row.get("score"),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn upsert_bars(&self, symbol: &str, bars: &[Bar]) -> Result<usize, BoxError> {
        let symbol = symbol.to_uppercase();
        let mut client = self.client.lock().await;
        let tx = client
            .transaction()
            .await
            .map_err(|e| db_err("Failed to open transaction", e))?;

        for bar in bars {
            tx.execute(
                "INSERT INTO bars (symbol, date, open, high, low, close, volume)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (symbol, date) DO UPDATE
                 SET open = EXCLUDED.open, high = EXCLUDED.high,
                     low = EXCLUDED.low, close = EXCLUDED.close,
                     volume = EXCLUDED.volume",
                &[
                    &symbol,
                    &bar.date,
                    &bar.open,
                    &bar.high,
                    &bar.low,
                    &bar.close,
                    &bar.volume,
                ],
            )
            .await
            .map_err(|e| db_err("Failed to upsert bar", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit bar upsert", e))?;

        Ok(bars.len())
    }

    async fn bars_ascending(
        &self,
        symbol: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Bar>, BoxError> {
        let symbol = symbol.to_uppercase();
        let client = self.client.lock().await;

        let query = match limit {
            Some(n) => format!(
                "SELECT date, open, high, low, close, volume FROM bars
                 WHERE symbol = $1 ORDER BY date DESC LIMIT {}",
                n
            ),
            None => "SELECT date, open, high, low, close, volume FROM bars
                     WHERE symbol = $1 ORDER BY date DESC"
                .to_string(),
        };

        let rows = client
            .query(query.as_str(), &[&symbol])
            .await
            .map_err(|e| db_err("Failed to query bars", e))?;

        let mut bars: Vec<Bar> = rows.iter().map(bar_from_row).collect();
        bars.reverse();
        Ok(bars)
    }

    async fn bar_count(&self, symbol: &str) -> Result<usize, BoxError> {
        let symbol = symbol.to_uppercase();
        let client = self.client.lock().await;
        let row = client
            .query_one("SELECT COUNT(*) FROM bars WHERE symbol = $1", &[&symbol])
            .await
            .map_err(|e| db_err("Failed to count bars", e))?;
        let count: i64 = row.get(0);
        Ok(count as usize)
    }

    async fn existing_dates(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashSet<NaiveDate>, BoxError> {
        let symbol = symbol.to_uppercase();
        let client = self.client.lock().await;
        let rows = client
            .query(
                "SELECT date FROM bars WHERE symbol = $1 AND date BETWEEN $2 AND $3",
                &[&symbol, &from, &to],
            )
            .await
            .map_err(|e| db_err("Failed to query bar dates", e))?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    async fn replace_snapshots(
        &self,
        symbol: &str,
        rows: &[IndicatorSnapshot],
    ) -> Result<(), BoxError> {
        let symbol = symbol.to_uppercase();
        let mut client = self.client.lock().await;
        let tx = client
            .transaction()
            .await
            .map_err(|e| db_err("Failed to open transaction", e))?;

        // Score column deliberately excluded: the scoring engine owns it.
        for snap in rows {
            tx.execute(
                "UPDATE bars SET
                    sma20 = $3, sma50 = $4, sma200 = $5, ema9 = $6, ema21 = $7,
                    rsi14 = $8, macd_line = $9, macd_signal = $10, macd_hist = $11,
                    bb_upper = $12, bb_middle = $13, bb_lower = $14,
                    obv = $15, avg_vol20 = $16
                 WHERE symbol = $1 AND date = $2",
                &[
                    &symbol,
                    &snap.date,
                    &snap.sma20,
                    &snap.sma50,
                    &snap.sma200,
                    &snap.ema9,
                    &snap.ema21,
                    &snap.rsi14,
                    &snap.macd_line,
                    &snap.macd_signal,
                    &snap.macd_hist,
                    &snap.bb_upper,
                    &snap.bb_middle,
                    &snap.bb_lower,
                    &snap.obv,
                    &snap.avg_vol20,
                ],
            )
            .await
            .map_err(|e| db_err("Failed to write indicator row", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit indicator rewrite", e))?;

        Ok(())
    }

    async fn latest_snapshot(
        &self,
        symbol: &str,
    ) -> Result<Option<IndicatorSnapshot>, BoxError> {
        let symbol = symbol.to_uppercase();
        let client = self.client.lock().await;
        let rows = client
            .query(
                "SELECT * FROM bars WHERE symbol = $1 ORDER BY date DESC LIMIT 1",
                &[&symbol],
            )
            .await
            .map_err(|e| db_err("Failed to query latest indicator row", e))?;

        Ok(rows.first().map(snapshot_from_row))
    }

    async fn write_score(&self, symbol: &str, score: f64) -> Result<(), BoxError> {
        let symbol = symbol.to_uppercase();
        let client = self.client.lock().await;
        client
            .execute(
                "UPDATE bars SET score = $2 WHERE symbol = $1
                 AND date = (SELECT MAX(date) FROM bars WHERE symbol = $1)",
                &[&symbol, &score],
            )
            .await
            .map_err(|e| db_err("Failed to write score", e))?;
        Ok(())
    }

    async fn history_desc(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<(Bar, IndicatorSnapshot)>, BoxError> {
        let symbol = symbol.to_uppercase();
        let client = self.client.lock().await;
        let query = format!(
            "SELECT * FROM bars WHERE symbol = $1 ORDER BY date DESC LIMIT {}",
            limit
        );
        let rows = client
            .query(query.as_str(), &[&symbol])
            .await
            .map_err(|e| db_err("Failed to query history", e))?;

        Ok(rows
            .iter()
            .map(|r| (bar_from_row(r), snapshot_from_row(r)))
            .collect())
    }

    async fn active_stocks(&self, markets: &[Market]) -> Result<Vec<Stock>, BoxError> {
        let names: Vec<String> = markets.iter().map(|m| m.as_str().to_string()).collect();
        let client = self.client.lock().await;
        let rows = client
            .query(
                "SELECT symbol, name, market, active FROM stocks
                 WHERE active AND market = ANY($1) ORDER BY symbol",
                &[&names],
            )
            .await
            .map_err(|e| db_err("Failed to query stocks", e))?;

        let mut stocks = Vec::with_capacity(rows.len());
        for row in rows {
            let market_str: String = row.get("market");
            let market = match market_str.as_str() {
                "EU" => Market::Eu,
                _ => Market::Us,
            };
            stocks.push(Stock {
                symbol: row.get("symbol"),
                name: row.get("name"),
                market,
                active: row.get("active"),
            });
        }
        Ok(stocks)
    }

    async fn alert_rules(&self) -> Result<Vec<AlertRule>, BoxError> {
        let client = self.client.lock().await;
        let rows = client
            .query("SELECT id, params_json, enabled FROM alert_rules", &[])
            .await
            .map_err(|e| db_err("Failed to query alert rules", e))?;

        let mut rules = Vec::with_capacity(rows.len());
        for row in rows {
            let json: String = row.get("params_json");
            let params: StrategyParams = serde_json::from_str(&json)
                .map_err(|e| db_err("Failed to deserialize rule params", e))?;
            rules.push(AlertRule {
                id: Some(row.get("id")),
                params,
                enabled: row.get("enabled"),
            });
        }
        Ok(rules)
    }

    async fn recent_alert_exists(
        &self,
        symbol: &str,
        strategy: StrategyKind,
        since: DateTime<Utc>,
    ) -> Result<bool, BoxError> {
        let symbol = symbol.to_uppercase();
        let client = self.client.lock().await;
        let rows = client
            .query(
                "SELECT 1 FROM alerts
                 WHERE symbol = $1 AND strategy = $2 AND triggered_at > $3 LIMIT 1",
                &[&symbol, &strategy.as_str(), &since],
            )
            .await
            .map_err(|e| db_err("Failed to query recent alerts", e))?;
        Ok(!rows.is_empty())
    }

    async fn insert_alert(&self, alert: &Alert) -> Result<i64, BoxError> {
        let symbol = alert.symbol.to_uppercase();
        let client = self.client.lock().await;
        let row = client
            .query_one(
                "INSERT INTO alerts (symbol, strategy, score, message, triggered_at, acknowledged)
                 VALUES ($1, $2, $3, $4, $5, FALSE) RETURNING id",
                &[
                    &symbol,
                    &alert.strategy.as_str(),
                    &alert.score,
                    &alert.message,
                    &alert.triggered_at,
                ],
            )
            .await
            .map_err(|e| db_err("Failed to insert alert", e))?;
        Ok(row.get(0))
    }

    async fn user_settings(&self) -> Result<UserSettings, BoxError> {
        let client = self.client.lock().await;
        let rows = client
            .query("SELECT settings_json FROM user_settings WHERE id = 1", &[])
            .await
            .map_err(|e| db_err("Failed to query settings", e))?;

        match rows.first() {
            Some(row) => {
                let json: String = row.get(0);
                serde_json::from_str(&json)
                    .map_err(|e| db_err("Failed to deserialize settings", e))
            }
            None => Ok(UserSettings::default()),
        }
    }
}
