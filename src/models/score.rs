//! Composite score models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One weighted sub-score of the composite. Weights across a breakdown sum
/// to 1.0 and every `raw_score` is clamped to [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub name: String,
    pub weight: f64,
    pub raw_score: f64,
    pub weighted_score: f64,
}

impl ScoreComponent {
    pub fn new(name: &str, weight: f64, raw_score: f64) -> Self {
        Self {
            name: name.to_string(),
            weight,
            raw_score,
            weighted_score: raw_score * weight,
        }
    }
}

/// Composite opportunity score in [0, 100] with its component breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeScore {
    pub symbol: String,
    pub score: f64,
    pub components: Vec<ScoreComponent>,
    pub calculated_at: DateTime<Utc>,
}
