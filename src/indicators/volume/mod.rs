pub mod average;
pub mod obv;

pub use average::{average_volume, AverageVolume};
pub use obv::{obv, obv_series};
