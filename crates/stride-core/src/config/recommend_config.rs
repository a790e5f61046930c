//! Scoring constants for the recommendation engine.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Additive scoring factors, exclusion floors, and result limits.
///
/// The defaults reproduce the production scoring model: 30/20/10/25
/// bonuses, popularity contributing 0-10 points, and -100/-50 floors
/// that guarantee completed and in-progress courses are filtered out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// Bonus when a course shares at least one skill with the learner.
    pub skill_match_bonus: f64,
    /// Bonus when course difficulty equals the preferred difficulty.
    pub difficulty_exact_bonus: f64,
    /// Bonus for the one-step-easier difficulty pairs.
    pub difficulty_adjacent_bonus: f64,
    /// Bonus when every prerequisite is already completed.
    pub prerequisite_bonus: f64,
    /// Popularity is divided by this before being added.
    pub popularity_divisor: f64,
    /// Forced score for already-completed courses.
    pub completed_floor: f64,
    /// Forced score for in-progress courses.
    pub in_progress_floor: f64,
    /// Maximum number of scored recommendations returned.
    pub top_k: usize,
    /// Number of beginner courses returned on cold start.
    pub cold_start_limit: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            skill_match_bonus: 30.0,
            difficulty_exact_bonus: 20.0,
            difficulty_adjacent_bonus: 10.0,
            prerequisite_bonus: 25.0,
            popularity_divisor: 10.0,
            completed_floor: -100.0,
            in_progress_floor: -50.0,
            top_k: 5,
            cold_start_limit: 3,
        }
    }
}

impl RecommendConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "recommend.top_k".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.cold_start_limit == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "recommend.cold_start_limit".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if !(self.popularity_divisor > 0.0) {
            return Err(ConfigError::ValidationFailed {
                field: "recommend.popularity_divisor".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        // Floors above zero would let excluded courses survive the
        // score > 0 filter.
        if self.completed_floor > 0.0 || self.in_progress_floor > 0.0 {
            return Err(ConfigError::ValidationFailed {
                field: "recommend.completed_floor".to_string(),
                message: "exclusion floors must not be positive".to_string(),
            });
        }
        Ok(())
    }
}
