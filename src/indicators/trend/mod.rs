pub mod ema;
pub mod sma;

pub use ema::{ema, ema_series};
pub use sma::{sma, std_dev};
