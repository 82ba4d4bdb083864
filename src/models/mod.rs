//! Shared data models spanning the engine layers.

pub mod alert;
pub mod bar;
pub mod indicators;
pub mod score;
pub mod settings;
pub mod stock;

pub use alert::{Alert, AlertRule, StrategyKind, StrategyParams};
pub use bar::{Bar, BarInterval, HistoryPeriod, HistoryResponse, Quote};
pub use indicators::{IndicatorReport, IndicatorSnapshot};
pub use score::{CompositeScore, ScoreComponent};
pub use settings::UserSettings;
pub use stock::{Market, Stock};
