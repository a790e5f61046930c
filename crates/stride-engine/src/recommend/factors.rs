//! Additive scoring factors: skill match, difficulty alignment,
//! prerequisites, popularity, and the exclusion override.

use rustc_hash::FxHashSet;
use serde::Serialize;

use stride_core::config::RecommendConfig;
use stride_core::course::{Course, Difficulty};

/// Input data for scoring one course.
#[derive(Debug, Clone, Copy)]
pub struct FactorInput<'a> {
    pub course: &'a Course,
    pub preferred_difficulty: Difficulty,
    pub selected_skills: &'a FxHashSet<String>,
    pub completed_course_ids: &'a FxHashSet<String>,
    pub in_progress_course_ids: &'a FxHashSet<String>,
}

/// Per-factor contributions for one course.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub skill_match: f64,
    pub difficulty_alignment: f64,
    pub prerequisites: f64,
    pub popularity: f64,
    /// The forced floor when the course is excluded; `None` otherwise.
    pub exclusion: Option<f64>,
    pub total: f64,
}

/// Whether the course shares at least one skill tag with the learner.
/// Deliberately boolean: two overlapping skills score the same as one.
pub fn skill_match(course_skills: &[String], selected: &FxHashSet<String>) -> bool {
    course_skills.iter().any(|skill| selected.contains(skill))
}

/// Exact matches earn the full bonus; the one-step-easier pairs
/// (intermediate→beginner, advanced→intermediate) earn the adjacent
/// bonus. The relation is asymmetric: a harder-than-preferred course
/// earns nothing.
pub fn difficulty_alignment(
    preferred: Difficulty,
    course: Difficulty,
    config: &RecommendConfig,
) -> f64 {
    if course == preferred {
        config.difficulty_exact_bonus
    } else if matches!(
        (preferred, course),
        (Difficulty::Intermediate, Difficulty::Beginner)
            | (Difficulty::Advanced, Difficulty::Intermediate)
    ) {
        config.difficulty_adjacent_bonus
    } else {
        0.0
    }
}

/// Vacuously true when the course has no prerequisites.
pub fn prerequisites_met(prerequisites: &[String], completed: &FxHashSet<String>) -> bool {
    prerequisites.iter().all(|id| completed.contains(id))
}

/// Popularity contributes `popularity / divisor` points (0-10 with the
/// defaults); non-finite values degrade to 0.
pub fn popularity_points(course: &Course, divisor: f64) -> f64 {
    course.popularity_or_zero() / divisor
}

/// Score one course: sum the factors, then apply the exclusion
/// override. The override is a forced floor, not a subtraction, so no
/// combination of bonuses can resurrect an excluded course.
pub fn breakdown(input: &FactorInput<'_>, config: &RecommendConfig) -> ScoreBreakdown {
    let course = input.course;

    let skill = if skill_match(&course.skills, input.selected_skills) {
        config.skill_match_bonus
    } else {
        0.0
    };
    let difficulty = difficulty_alignment(input.preferred_difficulty, course.difficulty, config);
    let prereq = if prerequisites_met(&course.prerequisites, input.completed_course_ids) {
        config.prerequisite_bonus
    } else {
        0.0
    };
    let popularity = popularity_points(course, config.popularity_divisor);

    let exclusion = if input.completed_course_ids.contains(&course.id) {
        Some(config.completed_floor)
    } else if input.in_progress_course_ids.contains(&course.id) {
        Some(config.in_progress_floor)
    } else {
        None
    };

    let total = exclusion.unwrap_or(skill + difficulty + prereq + popularity);

    ScoreBreakdown {
        skill_match: skill,
        difficulty_alignment: difficulty,
        prerequisites: prereq,
        popularity,
        exclusion,
        total,
    }
}

/// The final score for one course.
pub fn score_course(input: &FactorInput<'_>, config: &RecommendConfig) -> f64 {
    breakdown(input, config).total
}
