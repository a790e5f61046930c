//! Learner preferences, performance metrics, activity stats, and the
//! persisted profile payload.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::course::Difficulty;
use crate::errors::ValidationError;

/// How the learner prefers material presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningStyle {
    Visual,
    Auditory,
    Reading,
    Kinesthetic,
}

impl Default for LearningStyle {
    fn default() -> Self {
        Self::Visual
    }
}

impl LearningStyle {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Auditory => "auditory",
            Self::Reading => "reading",
            Self::Kinesthetic => "kinesthetic",
        }
    }
}

impl fmt::Display for LearningStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LearningStyle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visual" => Ok(Self::Visual),
            "auditory" => Ok(Self::Auditory),
            "reading" => Ok(Self::Reading),
            "kinesthetic" => Ok(Self::Kinesthetic),
            other => Err(ValidationError::UnknownEnumValue {
                field: "learning_style",
                value: other.to_string(),
            }),
        }
    }
}

/// Preferred learning pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pace {
    Slow,
    Moderate,
    Fast,
}

impl Default for Pace {
    fn default() -> Self {
        Self::Moderate
    }
}

impl Pace {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Moderate => "moderate",
            Self::Fast => "fast",
        }
    }
}

impl fmt::Display for Pace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pace {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slow" => Ok(Self::Slow),
            "moderate" => Ok(Self::Moderate),
            "fast" => Ok(Self::Fast),
            other => Err(ValidationError::UnknownEnumValue {
                field: "pace",
                value: other.to_string(),
            }),
        }
    }
}

/// Learning preferences. Seeded with defaults on first session and
/// merged, never replaced, on update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerPreferences {
    pub learning_style: LearningStyle,
    pub difficulty: Difficulty,
    pub pace: Pace,
    pub topics: FxHashSet<String>,
    pub session_duration_minutes: u32,
}

impl Default for LearnerPreferences {
    fn default() -> Self {
        Self {
            learning_style: LearningStyle::Visual,
            difficulty: Difficulty::Intermediate,
            pace: Pace::Moderate,
            topics: FxHashSet::default(),
            session_duration_minutes: 60,
        }
    }
}

/// Partial preference update. Only `Some` fields override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesUpdate {
    pub learning_style: Option<LearningStyle>,
    pub difficulty: Option<Difficulty>,
    pub pace: Option<Pace>,
    pub topics: Option<FxHashSet<String>>,
    pub session_duration_minutes: Option<u32>,
}

impl LearnerPreferences {
    /// Shallow-merge an update: unspecified fields retain prior values.
    pub fn merge(&mut self, update: &PreferencesUpdate) {
        if let Some(v) = update.learning_style {
            self.learning_style = v;
        }
        if let Some(v) = update.difficulty {
            self.difficulty = v;
        }
        if let Some(v) = update.pace {
            self.pace = v;
        }
        if let Some(ref v) = update.topics {
            self.topics = v.clone();
        }
        if let Some(v) = update.session_duration_minutes {
            self.session_duration_minutes = v;
        }
    }
}

/// Observed performance signals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceMetrics {
    /// Quiz success rate on a 0-100 scale.
    pub quiz_success_rate: f64,
    /// Challenge success rate on a 0-100 scale.
    pub challenge_success_rate: f64,
    pub consistency_score: f64,
    pub engagement_score: f64,
    pub average_completion_time_minutes: f64,
    pub skill_growth_rate: FxHashMap<String, f64>,
}

impl PerformanceMetrics {
    /// Difficulty suggested by observed success rates. Pure, derived on
    /// every call, never cached.
    pub fn recommended_difficulty(&self) -> Difficulty {
        let avg = (self.quiz_success_rate + self.challenge_success_rate) / 2.0;
        if avg > 85.0 {
            Difficulty::Advanced
        } else if avg > 65.0 {
            Difficulty::Intermediate
        } else {
            Difficulty::Beginner
        }
    }

    /// Overwrite only the keys named by the update.
    pub fn merge(&mut self, update: &MetricsUpdate) {
        if let Some(v) = update.quiz_success_rate {
            self.quiz_success_rate = v;
        }
        if let Some(v) = update.challenge_success_rate {
            self.challenge_success_rate = v;
        }
        if let Some(v) = update.consistency_score {
            self.consistency_score = v;
        }
        if let Some(v) = update.engagement_score {
            self.engagement_score = v;
        }
        if let Some(v) = update.average_completion_time_minutes {
            self.average_completion_time_minutes = v;
        }
        if let Some(ref v) = update.skill_growth_rate {
            self.skill_growth_rate = v.clone();
        }
    }
}

/// Partial metrics update. Only `Some` fields overwrite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsUpdate {
    pub quiz_success_rate: Option<f64>,
    pub challenge_success_rate: Option<f64>,
    pub consistency_score: Option<f64>,
    pub engagement_score: Option<f64>,
    pub average_completion_time_minutes: Option<f64>,
    pub skill_growth_rate: Option<FxHashMap<String, f64>>,
}

impl MetricsUpdate {
    /// Success rates must stay on the 0-100 scale.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (metric, value) in [
            ("quiz_success_rate", self.quiz_success_rate),
            ("challenge_success_rate", self.challenge_success_rate),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || !(0.0..=100.0).contains(&v) {
                    return Err(ValidationError::MetricOutOfRange { metric, value: v });
                }
            }
        }
        Ok(())
    }
}

/// Streak state plus activity counters derived from completion events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningStats {
    /// Consecutive calendar days with at least one qualifying event.
    pub learning_streak: u32,
    pub last_active: Option<DateTime<Utc>>,
    /// Running average over all scored activities.
    pub average_score: f64,
    /// Number of scores folded into `average_score`.
    pub score_samples: u64,
    pub lessons_completed: u64,
    pub quizzes_completed: u64,
    pub perfect_quizzes: u64,
    pub assignments_submitted: u64,
    pub peer_evaluations: u64,
    pub courses_completed: u64,
}

/// The full `learner-profile` persisted payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileState {
    pub selected_skills: FxHashSet<String>,
    pub preferences: LearnerPreferences,
    pub metrics: PerformanceMetrics,
    pub stats: LearningStats,
    /// Course ids that have earned the course-completion reward.
    pub completed_courses: FxHashSet<String>,
    /// Unlocked achievement ids.
    pub achievements: FxHashSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_merge_keeps_unspecified_fields() {
        let mut prefs = LearnerPreferences::default();
        prefs.merge(&PreferencesUpdate {
            pace: Some(Pace::Fast),
            ..Default::default()
        });
        assert_eq!(prefs.pace, Pace::Fast);
        assert_eq!(prefs.difficulty, Difficulty::Intermediate);
        assert_eq!(prefs.session_duration_minutes, 60);
    }

    #[test]
    fn metrics_merge_overwrites_named_keys_only() {
        let mut metrics = PerformanceMetrics {
            quiz_success_rate: 70.0,
            challenge_success_rate: 60.0,
            ..Default::default()
        };
        metrics.merge(&MetricsUpdate {
            quiz_success_rate: Some(90.0),
            ..Default::default()
        });
        assert_eq!(metrics.quiz_success_rate, 90.0);
        assert_eq!(metrics.challenge_success_rate, 60.0);
    }

    #[test]
    fn recommended_difficulty_thresholds() {
        let mut metrics = PerformanceMetrics::default();
        assert_eq!(metrics.recommended_difficulty(), Difficulty::Beginner);

        metrics.quiz_success_rate = 70.0;
        metrics.challenge_success_rate = 70.0;
        assert_eq!(metrics.recommended_difficulty(), Difficulty::Intermediate);

        metrics.quiz_success_rate = 90.0;
        metrics.challenge_success_rate = 90.0;
        assert_eq!(metrics.recommended_difficulty(), Difficulty::Advanced);

        // 85 exactly is not advanced; 65 exactly is not intermediate.
        metrics.quiz_success_rate = 85.0;
        metrics.challenge_success_rate = 85.0;
        assert_eq!(metrics.recommended_difficulty(), Difficulty::Intermediate);
        metrics.quiz_success_rate = 65.0;
        metrics.challenge_success_rate = 65.0;
        assert_eq!(metrics.recommended_difficulty(), Difficulty::Beginner);
    }

    #[test]
    fn metrics_update_rejects_out_of_range_rate() {
        let update = MetricsUpdate {
            quiz_success_rate: Some(120.0),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = MetricsUpdate {
            challenge_success_rate: Some(-1.0),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn unknown_style_string_is_rejected() {
        let err = "osmosis".parse::<LearningStyle>().unwrap_err();
        assert!(matches!(err, ValidationError::UnknownEnumValue { .. }));
    }
}
