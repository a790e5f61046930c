//! Handler trait for progression events.

use super::types::*;

/// Receives engine events. All methods default to no-ops so handlers
/// implement only what they care about.
pub trait LearnerEventHandler: Send + Sync {
    fn on_xp_awarded(&self, _event: &XpAwardedEvent) {}
    fn on_level_up(&self, _event: &LevelUpEvent) {}
    fn on_node_completed(&self, _event: &NodeCompletedEvent) {}
    fn on_streak_changed(&self, _event: &StreakChangedEvent) {}
    fn on_achievement_unlocked(&self, _event: &AchievementUnlockedEvent) {}
    fn on_progression_reset(&self, _event: &ProgressionResetEvent) {}
}
