//! The recommendation engine: cold start, scoring, ranking.

use std::cmp::Ordering;

use rustc_hash::FxHashSet;
use serde::Serialize;

use stride_core::config::RecommendConfig;
use stride_core::course::{Course, Difficulty};
use stride_core::errors::{EngineError, NotFoundError};
use stride_core::profile::LearnerPreferences;

use super::factors::{self, FactorInput, ScoreBreakdown};

/// One ranked recommendation.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub course: Course,
    pub score: f64,
}

/// Deterministic rule-based recommender. Pure: no shared state, no
/// caching across calls, no randomness, so identical inputs produce an
/// identical ordered result. Ties preserve catalog input order.
pub struct RecommendationEngine {
    config: RecommendConfig,
}

impl RecommendationEngine {
    pub fn new(config: RecommendConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(RecommendConfig::default())
    }

    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }

    /// Produce ranked recommendations from a snapshot of learner state
    /// and the catalog.
    ///
    /// With no selected skills the scoring model is bypassed entirely:
    /// the top beginner courses by popularity are returned (cold
    /// start). Otherwise every course is scored, sorted descending,
    /// filtered to positive scores, and truncated to the top K.
    pub fn generate(
        &self,
        preferences: &LearnerPreferences,
        selected_skills: &FxHashSet<String>,
        catalog: &[Course],
        completed_course_ids: &FxHashSet<String>,
        in_progress_course_ids: &FxHashSet<String>,
    ) -> Vec<Recommendation> {
        if selected_skills.is_empty() {
            return self.cold_start(catalog);
        }

        let mut scored: Vec<Recommendation> = catalog
            .iter()
            .map(|course| {
                let input = FactorInput {
                    course,
                    preferred_difficulty: preferences.difficulty,
                    selected_skills,
                    completed_course_ids,
                    in_progress_course_ids,
                };
                Recommendation {
                    course: course.clone(),
                    score: factors::score_course(&input, &self.config),
                }
            })
            .collect();

        sort_descending(&mut scored);
        scored.retain(|r| r.score > 0.0);
        scored.truncate(self.config.top_k);
        scored
    }

    /// No skill signal yet: the top beginner courses by popularity.
    /// The reported score is the popularity ranking key itself.
    fn cold_start(&self, catalog: &[Course]) -> Vec<Recommendation> {
        let mut beginners: Vec<Recommendation> = catalog
            .iter()
            .filter(|course| course.difficulty == Difficulty::Beginner)
            .map(|course| Recommendation {
                course: course.clone(),
                score: course.popularity_or_zero(),
            })
            .collect();

        sort_descending(&mut beginners);
        beginners.truncate(self.config.cold_start_limit);
        beginners
    }

    /// Per-factor score breakdown for a single catalog course.
    pub fn explain(
        &self,
        course_id: &str,
        preferences: &LearnerPreferences,
        selected_skills: &FxHashSet<String>,
        catalog: &[Course],
        completed_course_ids: &FxHashSet<String>,
        in_progress_course_ids: &FxHashSet<String>,
    ) -> Result<ScoreBreakdown, EngineError> {
        let course = catalog
            .iter()
            .find(|c| c.id == course_id)
            .ok_or_else(|| NotFoundError::CourseNotFound {
                course_id: course_id.to_string(),
            })?;

        let input = FactorInput {
            course,
            preferred_difficulty: preferences.difficulty,
            selected_skills,
            completed_course_ids,
            in_progress_course_ids,
        };
        Ok(factors::breakdown(&input, &self.config))
    }
}

/// Stable descending sort: equal scores keep catalog input order.
fn sort_descending(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}
