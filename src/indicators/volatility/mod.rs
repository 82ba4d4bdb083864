pub mod bollinger;

pub use bollinger::{bollinger_bands, bollinger_bands_default, BollingerBands};
