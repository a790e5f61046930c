//! XP rewards and the level threshold table.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// One row of the level table: the cumulative XP required to hold
/// `level`, and the title shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelThreshold {
    pub level: u32,
    pub xp: i64,
    pub title: String,
}

impl LevelThreshold {
    fn new(level: u32, xp: i64, title: &str) -> Self {
        Self {
            level,
            xp,
            title: title.to_string(),
        }
    }
}

/// XP rewards per learner action, plus the level table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// XP for the first completion of a roadmap node.
    pub node_reward: i64,
    /// XP for completing a lesson.
    pub lesson_reward: i64,
    /// XP for passing a quiz.
    pub quiz_reward: i64,
    /// Bonus XP for a 100% quiz score.
    pub perfect_quiz_bonus: i64,
    /// XP for submitting an assignment.
    pub assignment_reward: i64,
    /// XP for completing a peer evaluation.
    pub peer_evaluation_reward: i64,
    /// XP for completing a whole course.
    pub course_reward: i64,
    /// Ascending level thresholds. Must start at 0 XP.
    pub levels: Vec<LevelThreshold>,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            node_reward: 50,
            lesson_reward: 25,
            quiz_reward: 50,
            perfect_quiz_bonus: 100,
            assignment_reward: 75,
            peer_evaluation_reward: 50,
            course_reward: 500,
            levels: vec![
                LevelThreshold::new(1, 0, "Beginner"),
                LevelThreshold::new(2, 100, "Student"),
                LevelThreshold::new(3, 300, "Learner"),
                LevelThreshold::new(4, 600, "Scholar"),
                LevelThreshold::new(5, 1000, "Expert"),
                LevelThreshold::new(6, 1500, "Master"),
                LevelThreshold::new(7, 2500, "Guru"),
                LevelThreshold::new(8, 4000, "Legend"),
                LevelThreshold::new(9, 6000, "Champion"),
                LevelThreshold::new(10, 10000, "Grandmaster"),
            ],
        }
    }
}

impl ProgressionConfig {
    /// Validate reward amounts and the level table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("progression.node_reward", self.node_reward),
            ("progression.lesson_reward", self.lesson_reward),
            ("progression.quiz_reward", self.quiz_reward),
            ("progression.perfect_quiz_bonus", self.perfect_quiz_bonus),
            ("progression.assignment_reward", self.assignment_reward),
            ("progression.peer_evaluation_reward", self.peer_evaluation_reward),
            ("progression.course_reward", self.course_reward),
        ] {
            if value <= 0 {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }

        if self.levels.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "progression.levels".to_string(),
                message: "level table must not be empty".to_string(),
            });
        }
        if self.levels[0].xp != 0 {
            return Err(ConfigError::ValidationFailed {
                field: "progression.levels".to_string(),
                message: "first level must require 0 XP".to_string(),
            });
        }
        for pair in self.levels.windows(2) {
            if pair[1].xp <= pair[0].xp || pair[1].level <= pair[0].level {
                return Err(ConfigError::ValidationFailed {
                    field: "progression.levels".to_string(),
                    message: "levels must be strictly ascending".to_string(),
                });
            }
        }
        Ok(())
    }
}
