pub mod context;
pub mod market_sync;

pub use context::JobContext;
pub use market_sync::{run_market_sync, SyncSummary};
