//! Achievement definitions and unlock checks.
//!
//! Checks are pure functions of `LearningStats`; the session records
//! unlocked ids in the profile payload and routes each XP bonus
//! through the ledger, so every achievement pays out exactly once.

use rustc_hash::FxHashSet;

use stride_core::profile::LearningStats;

/// A static achievement definition.
#[derive(Debug, Clone, Copy)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub xp_bonus: i64,
}

/// The built-in achievement table.
pub const ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: "first_course",
        name: "First Steps",
        description: "Complete your first course",
        xp_bonus: 100,
    },
    AchievementDef {
        id: "quiz_master",
        name: "Quiz Master",
        description: "Score 100% on 5 quizzes",
        xp_bonus: 250,
    },
    AchievementDef {
        id: "streak_warrior",
        name: "Streak Warrior",
        description: "Maintain a 7-day learning streak",
        xp_bonus: 200,
    },
    AchievementDef {
        id: "course_collector",
        name: "Course Collector",
        description: "Complete 5 courses",
        xp_bonus: 500,
    },
    AchievementDef {
        id: "assignment_ace",
        name: "Assignment Ace",
        description: "Submit 10 assignments",
        xp_bonus: 400,
    },
];

/// Whether the stats satisfy the named achievement.
fn criteria_met(id: &str, stats: &LearningStats) -> bool {
    match id {
        "first_course" => stats.courses_completed >= 1,
        "quiz_master" => stats.perfect_quizzes >= 5,
        "streak_warrior" => stats.learning_streak >= 7,
        "course_collector" => stats.courses_completed >= 5,
        "assignment_ace" => stats.assignments_submitted >= 10,
        _ => false,
    }
}

/// Achievements newly earned by `stats` that are not already unlocked.
pub fn newly_unlocked(
    stats: &LearningStats,
    unlocked: &FxHashSet<String>,
) -> Vec<&'static AchievementDef> {
    ACHIEVEMENTS
        .iter()
        .filter(|def| !unlocked.contains(def.id) && criteria_met(def.id, stats))
        .collect()
}

/// Look up a definition by id.
pub fn find(id: &str) -> Option<&'static AchievementDef> {
    ACHIEVEMENTS.iter().find(|def| def.id == id)
}
