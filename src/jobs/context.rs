//! Job context for dependency injection

use crate::alerts::AlertEngine;
use crate::indicators::IndicatorEngine;
use crate::metrics::Metrics;
use crate::services::MarketDataGateway;
use crate::store::Store;
use std::sync::Arc;

/// Shared dependencies handed to scheduled job handlers.
pub struct JobContext {
    pub store: Arc<dyn Store>,
    pub gateway: Arc<MarketDataGateway>,
    pub indicators: Arc<IndicatorEngine>,
    pub alerts: Arc<AlertEngine>,
    pub metrics: Option<Arc<Metrics>>,
}

impl JobContext {
    pub fn new(
        store: Arc<dyn Store>,
        gateway: Arc<MarketDataGateway>,
        indicators: Arc<IndicatorEngine>,
        alerts: Arc<AlertEngine>,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        Self {
            store,
            gateway,
            indicators,
            alerts,
            metrics,
        }
    }
}
