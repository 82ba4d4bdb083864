//! Stockwatch: daily-bar market data sync, indicator computation,
//! opportunity scoring and rule-based alerting.

pub mod alerts;
pub mod cache;
pub mod config;
pub mod indicators;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod scheduler;
pub mod scoring;
pub mod services;
pub mod store;
