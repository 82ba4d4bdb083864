//! Scheduled market synchronization: fetch bars, recompute indicators,
//! then sweep alert rules.

use crate::jobs::context::JobContext;
use crate::models::HistoryPeriod;
use crate::services::market::MarketHours;
use crate::store::BoxError;
use chrono::Utc;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, error, info};

/// Symbols with fewer stored bars than this get a one-year backfill
/// instead of the incremental one-month window.
const BACKFILL_THRESHOLD: usize = 200;

#[derive(Debug, Default, Clone, Serialize)]
pub struct SyncSummary {
    pub total_symbols: usize,
    pub synced: usize,
    pub failed: usize,
    pub bars_written: usize,
    pub duration_ms: u64,
}

/// One sync sweep over every active stock in a currently-open market.
/// Per-symbol failures are logged and counted, never fatal to the sweep.
pub async fn run_market_sync(ctx: &JobContext) -> Result<SyncSummary, BoxError> {
    let start = Instant::now();

    let open = MarketHours::open_markets(Utc::now());
    if open.is_empty() {
        info!("MarketSync: all markets closed, skipping run");
        return Ok(SyncSummary::default());
    }

    let stocks = ctx.store.active_stocks(&open).await?;
    let total = stocks.len();
    info!(
        markets = ?open,
        symbols = total,
        "MarketSync: starting sweep of {} symbols",
        total
    );

    if let Some(ref metrics) = ctx.metrics {
        metrics.sync_runs_total.inc();
    }

    let mut summary = SyncSummary {
        total_symbols: total,
        ..SyncSummary::default()
    };

    for (i, stock) in stocks.iter().enumerate() {
        match sync_symbol(ctx, &stock.symbol).await {
            Ok(written) => {
                summary.synced += 1;
                summary.bars_written += written;
            }
            Err(e) => {
                summary.failed += 1;
                if let Some(ref metrics) = ctx.metrics {
                    metrics.sync_failures_total.inc();
                }
                error!(
                    symbol = %stock.symbol,
                    error = %e,
                    "MarketSync: sync failed for {}",
                    stock.symbol
                );
            }
        }

        let done = i + 1;
        if total >= 10 {
            if let Some(pct) = progress_milestone(done, total) {
                info!(
                    done = done,
                    total = total,
                    percent = pct,
                    "MarketSync: progress {}/{} ({}%)",
                    done,
                    total,
                    pct
                );
            }
        }
    }

    if summary.synced > 0 {
        match ctx.alerts.evaluate_all().await {
            Ok(alerts) => {
                if let Some(ref metrics) = ctx.metrics {
                    metrics.alerts_created_total.inc_by(alerts.created_alerts as u64);
                }
            }
            Err(e) => {
                error!(error = %e, "MarketSync: alert sweep failed");
            }
        }
    }

    summary.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        synced = summary.synced,
        failed = summary.failed,
        bars_written = summary.bars_written,
        duration_ms = summary.duration_ms,
        "MarketSync: sweep finished, {}/{} symbols synced in {}ms",
        summary.synced,
        summary.total_symbols,
        summary.duration_ms
    );

    Ok(summary)
}

/// Milestone percentage (10, 50 or 100) crossed by finishing symbol `done`
/// of `total`, if any. Crossing, not exact divisibility, so every sweep of
/// ten or more symbols logs each milestone exactly once.
pub fn progress_milestone(done: usize, total: usize) -> Option<u64> {
    if total == 0 || done == 0 || done > total {
        return None;
    }
    let pct = (done * 100 / total) as u64;
    let prev = ((done - 1) * 100 / total) as u64;
    [100, 50, 10].into_iter().find(|&m| pct >= m && prev < m)
}

/// Fetch the history window for one symbol, persist bars the store has not
/// seen, and recompute its indicator rows. The latest bar is always
/// rewritten so an in-progress session stays current.
async fn sync_symbol(ctx: &JobContext, symbol: &str) -> Result<usize, BoxError> {
    let count = ctx.store.bar_count(symbol).await?;
    let period = if count < BACKFILL_THRESHOLD {
        HistoryPeriod::OneYear
    } else {
        HistoryPeriod::OneMonth
    };

    let history = ctx
        .gateway
        .get_history(symbol, period)
        .await
        .map_err(|e| Box::new(e) as BoxError)?;

    if history.bars.is_empty() {
        debug!(symbol = %symbol, "MarketSync: provider returned no bars for {}", symbol);
        return Ok(0);
    }

    let from = history.bars.first().map(|b| b.date).unwrap_or_default();
    let to = history.bars.last().map(|b| b.date).unwrap_or_default();
    let existing = ctx.store.existing_dates(symbol, from, to).await?;

    let latest_date = history.bars.last().map(|b| b.date);
    let fresh: Vec<_> = history
        .bars
        .iter()
        .filter(|b| !existing.contains(&b.date) || Some(b.date) == latest_date)
        .cloned()
        .collect();

    let written = if fresh.is_empty() {
        0
    } else {
        ctx.store.upsert_bars(symbol, &fresh).await?
    };

    if let Some(ref metrics) = ctx.metrics {
        metrics.bars_written_total.inc_by(written as u64);
    }

    ctx.indicators.compute_indicators(symbol).await?;

    debug!(
        symbol = %symbol,
        period = period.as_str(),
        fetched = history.bars.len(),
        written = written,
        "MarketSync: {} synced ({} bars written)",
        symbol,
        written
    );

    Ok(written)
}
