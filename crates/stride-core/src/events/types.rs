//! Event payloads emitted by the engine.

/// XP was awarded through the ledger.
#[derive(Debug, Clone)]
pub struct XpAwardedEvent {
    pub amount: i64,
    pub source: String,
    pub total_after: i64,
}

/// The award crossed a level threshold.
#[derive(Debug, Clone)]
pub struct LevelUpEvent {
    pub level: u32,
    pub title: String,
}

/// A roadmap node was completed for the first time.
#[derive(Debug, Clone)]
pub struct NodeCompletedEvent {
    pub roadmap_id: String,
    pub node_id: String,
}

/// The learning streak changed.
#[derive(Debug, Clone)]
pub struct StreakChangedEvent {
    pub streak: u32,
}

/// An achievement was unlocked.
#[derive(Debug, Clone)]
pub struct AchievementUnlockedEvent {
    pub achievement_id: String,
    pub xp_bonus: i64,
}

/// Progression was explicitly reset by the learner.
#[derive(Debug, Clone)]
pub struct ProgressionResetEvent {}
