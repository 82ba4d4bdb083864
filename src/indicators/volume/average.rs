//! Trailing average volume indicator

use crate::indicators::trend::sma;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageVolume {
    pub average: f64,
    /// Latest volume over the trailing average; 0 when the average is 0.
    pub ratio: f64,
}

/// Mean of the last `period` volumes plus the latest-to-average ratio.
pub fn average_volume(volumes: &[f64], period: usize) -> Option<AverageVolume> {
    let average = sma(volumes, period)?;
    let latest = *volumes.last()?;

    let ratio = if average == 0.0 { 0.0 } else { latest / average };

    Some(AverageVolume { average, ratio })
}
