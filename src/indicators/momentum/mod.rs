pub mod macd;
pub mod rsi;

pub use macd::{macd, macd_default, Macd};
pub use rsi::{rsi, rsi_default};
