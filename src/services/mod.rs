pub mod gateway;
pub mod market;
pub mod provider;
pub mod rate_limit;

pub use gateway::MarketDataGateway;
pub use market::{detect_market, exchange_name, MarketHours};
pub use provider::{HttpMarketDataProvider, MarketDataProvider, ProviderError};
pub use rate_limit::RateLimiter;
