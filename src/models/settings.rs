//! User settings singleton

use crate::models::alert::StrategyKind;
use serde::{Deserialize, Serialize};

/// Singleton record gating which strategies are evaluated and the minimum
/// composite score an alert must carry. The notification-display fields are
/// consumed by the surrounding system, not by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    pub pullback_enabled: bool,
    pub breakout_enabled: bool,
    pub macd_cross_enabled: bool,
    pub score_threshold_enabled: bool,
    pub min_alert_score: f64,
    pub notifications_enabled: bool,
    pub notification_sound: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            pullback_enabled: true,
            breakout_enabled: true,
            macd_cross_enabled: true,
            score_threshold_enabled: true,
            min_alert_score: 0.0,
            notifications_enabled: true,
            notification_sound: false,
        }
    }
}

impl UserSettings {
    pub fn strategy_enabled(&self, kind: StrategyKind) -> bool {
        match kind {
            StrategyKind::Pullback => self.pullback_enabled,
            StrategyKind::Breakout => self.breakout_enabled,
            StrategyKind::MacdCross => self.macd_cross_enabled,
            StrategyKind::ScoreThreshold => self.score_threshold_enabled,
        }
    }
}
