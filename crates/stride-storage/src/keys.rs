//! The logical keys the engine persists.

/// XP total plus event history.
pub const PROGRESSION_STATE: &str = "progression-state";

/// Roadmap id → completed node id sets.
pub const COMPLETION_SETS: &str = "completion-sets";

/// Skills, preferences, metrics, stats, achievements.
pub const LEARNER_PROFILE: &str = "learner-profile";
