//! Stockwatch Worker
//!
//! Runs the market sync job on a cron schedule: fetch daily bars, recompute
//! indicators, score and evaluate alert rules.

use dotenvy::dotenv;
use std::sync::Arc;
use stockwatch::alerts::AlertEngine;
use stockwatch::config;
use stockwatch::indicators::IndicatorEngine;
use stockwatch::jobs::{self, JobContext};
use stockwatch::logging;
use stockwatch::metrics::Metrics;
use stockwatch::scheduler::{JobFuture, JobHandler, Scheduler};
use stockwatch::scoring::ScoringEngine;
use stockwatch::services::provider::{HttpMarketDataProvider, MarketDataProvider};
use stockwatch::services::MarketDataGateway;
use stockwatch::store::{PgStore, Store};
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    logging::init_logging();

    let env = config::get_environment();
    info!("Starting Stockwatch Worker");
    info!(environment = %env, "Environment");

    let metrics = Arc::new(Metrics::new()?);

    info!("Connecting to Postgres...");
    let store: Arc<dyn Store> = match PgStore::connect().await {
        Ok(store) => {
            info!("Postgres connected");
            metrics.database_connected.set(1.0);
            Arc::new(store)
        }
        Err(e) => {
            return Err(format!("Postgres connection required for worker: {}", e).into());
        }
    };

    let provider: Arc<dyn MarketDataProvider> = Arc::new(HttpMarketDataProvider::with_base_url(
        config::get_provider_base_url(),
    )?);
    let gateway = Arc::new(MarketDataGateway::new(provider.clone()).with_metrics(metrics.clone()));

    let indicators = Arc::new(IndicatorEngine::new(store.clone()));
    let scoring = Arc::new(ScoringEngine::new(store.clone(), provider.clone()));
    let alerts = Arc::new(AlertEngine::new(store.clone(), scoring.clone()));

    let ctx = Arc::new(JobContext::new(
        store.clone(),
        gateway.clone(),
        indicators.clone(),
        alerts.clone(),
        Some(metrics.clone()),
    ));

    let scheduler = Scheduler::new();
    let sync_cron = config::get_sync_cron();
    let sync_ctx = ctx.clone();
    let handler: JobHandler = Arc::new(move || -> JobFuture {
        let ctx = sync_ctx.clone();
        Box::pin(async move { jobs::run_market_sync(&ctx).await.map(|_| ()) })
    });
    scheduler
        .register_job("market-sync", &sync_cron, handler, true)
        .await?;

    scheduler.start().await;
    info!(cron = %sync_cron, "Worker started, waiting for shutdown signal...");

    signal::ctrl_c().await?;
    info!("Shutting down worker...");
    scheduler.stop().await;
    info!("Worker stopped");

    Ok(())
}
