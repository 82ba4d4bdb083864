pub mod engine;
pub mod strategies;

pub use engine::{AlertEngine, AlertSummary};
