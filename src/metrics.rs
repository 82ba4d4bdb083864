//! Prometheus metrics for sync and alerting activity

use prometheus::{Encoder, Gauge, IntCounter, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub provider_requests_total: IntCounter,
    pub cache_hits_total: IntCounter,
    pub cache_misses_total: IntCounter,
    pub sync_runs_total: IntCounter,
    pub sync_failures_total: IntCounter,
    pub bars_written_total: IntCounter,
    pub alerts_created_total: IntCounter,
    pub database_connected: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let provider_requests_total =
            IntCounter::new("provider_requests_total", "Outbound market data requests")?;
        let cache_hits_total =
            IntCounter::new("cache_hits_total", "Gateway cache hits")?;
        let cache_misses_total =
            IntCounter::new("cache_misses_total", "Gateway cache misses")?;
        let sync_runs_total =
            IntCounter::new("sync_runs_total", "Market sync sweeps started")?;
        let sync_failures_total =
            IntCounter::new("sync_failures_total", "Per-symbol sync failures")?;
        let bars_written_total =
            IntCounter::new("bars_written_total", "Bars upserted into the store")?;
        let alerts_created_total =
            IntCounter::new("alerts_created_total", "Alerts created by rule evaluation")?;
        let database_connected =
            Gauge::new("database_connected", "1 when the database is reachable")?;

        registry.register(Box::new(provider_requests_total.clone()))?;
        registry.register(Box::new(cache_hits_total.clone()))?;
        registry.register(Box::new(cache_misses_total.clone()))?;
        registry.register(Box::new(sync_runs_total.clone()))?;
        registry.register(Box::new(sync_failures_total.clone()))?;
        registry.register(Box::new(bars_written_total.clone()))?;
        registry.register(Box::new(alerts_created_total.clone()))?;
        registry.register(Box::new(database_connected.clone()))?;

        Ok(Self {
            registry,
            provider_requests_total,
            cache_hits_total,
            cache_misses_total,
            sync_runs_total,
            sync_failures_total,
            bars_written_total,
            alerts_created_total,
            database_connected,
        })
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}
