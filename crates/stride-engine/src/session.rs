//! The per-learner session facade.
//!
//! One explicitly-constructed instance per learner session, injected
//! with its store; no global singletons. Mutating operations are
//! serialized behind a single mutex and persist write-through before
//! returning; `recommend` snapshots state under the lock and computes
//! without it.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use serde::Serialize;

use stride_core::config::StrideConfig;
use stride_core::course::Difficulty;
use stride_core::errors::{EngineError, StorageError, ValidationError};
use stride_core::events::{
    AchievementUnlockedEvent, EventDispatcher, LearnerEventHandler, LevelUpEvent,
    NodeCompletedEvent, ProgressionResetEvent, StreakChangedEvent, XpAwardedEvent,
};
use stride_core::profile::{
    LearningStats, MetricsUpdate, PerformanceMetrics, PreferencesUpdate,
};
use stride_core::progression::{LevelInfo, XpEvent};
use stride_storage::PersistentStore;

use crate::achievements;
use crate::catalog::CourseCatalog;
use crate::completion::CompletionTracker;
use crate::profile::LearnerProfile;
use crate::progression::{ProgressionLedger, XpAward};
use crate::recommend::{Recommendation, RecommendationEngine, ScoreBreakdown};
use crate::streak;

/// Result of a node completion attempt.
#[derive(Debug, Clone, Serialize)]
pub struct NodeOutcome {
    pub newly_completed: bool,
    /// XP granted by this call, excluding achievement bonuses.
    pub xp_awarded: i64,
    pub total_xp: i64,
    pub level: LevelInfo,
    pub streak: u32,
    pub unlocked_achievements: Vec<String>,
}

/// Result of recording an XP-granting learner activity.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityOutcome {
    /// XP granted by the activity itself, excluding achievement bonuses.
    pub xp_awarded: i64,
    pub total_xp: i64,
    pub level: LevelInfo,
    pub streak: u32,
    pub average_score: f64,
    pub unlocked_achievements: Vec<String>,
}

struct SessionInner {
    ledger: ProgressionLedger,
    tracker: CompletionTracker,
    profile: LearnerProfile,
    dispatcher: EventDispatcher,
}

/// A learner session over an injected persistent store.
pub struct LearnerSession {
    inner: Mutex<SessionInner>,
    engine: RecommendationEngine,
    config: StrideConfig,
}

impl LearnerSession {
    /// Open a session: load all persisted state, seeding defaults for
    /// absent keys and recovering from corrupt payloads. `config` is
    /// expected to come from `StrideConfig::load`/`from_toml` (already
    /// validated) or `StrideConfig::default()`.
    pub fn open(store: Arc<dyn PersistentStore>, config: StrideConfig) -> Result<Self, EngineError> {
        let ledger = ProgressionLedger::load(store.clone(), config.progression.clone())?;
        let tracker = CompletionTracker::load(store.clone(), config.progression.node_reward)?;
        let profile = LearnerProfile::load(store)?;
        let engine = RecommendationEngine::new(config.recommend.clone());

        Ok(Self {
            inner: Mutex::new(SessionInner {
                ledger,
                tracker,
                profile,
                dispatcher: EventDispatcher::new(),
            }),
            engine,
            config,
        })
    }

    /// Register a push handler for progression events.
    pub fn register_handler(&self, handler: Arc<dyn LearnerEventHandler>) -> Result<(), EngineError> {
        self.lock()?.dispatcher.register(handler);
        Ok(())
    }

    // ---- Mutations ----

    /// Complete a roadmap node. The first completion of a pair awards
    /// the node reward exactly once and advances the streak; duplicate
    /// dispatches are harmless no-ops.
    pub fn complete_node(
        &self,
        roadmap_id: &str,
        node_id: &str,
        now: DateTime<Utc>,
    ) -> Result<NodeOutcome, EngineError> {
        let mut guard = self.lock()?;
        let SessionInner {
            ledger,
            tracker,
            profile,
            dispatcher,
        } = &mut *guard;

        let level_before = ledger.level_info();
        let newly_completed = tracker.mark_completed(roadmap_id, node_id, ledger, now)?;

        let mut unlocked = Vec::new();
        let mut xp_awarded = 0;
        if newly_completed {
            xp_awarded = self.config.progression.node_reward;
            dispatcher.emit_node_completed(&NodeCompletedEvent {
                roadmap_id: roadmap_id.to_string(),
                node_id: node_id.to_string(),
            });
            dispatcher.emit_xp_awarded(&XpAwardedEvent {
                amount: xp_awarded,
                source: format!("node:{node_id}"),
                total_after: ledger.total_xp(),
            });
            let level_after = ledger.level_info();
            if level_after.level > level_before.level {
                dispatcher.emit_level_up(&LevelUpEvent {
                    level: level_after.level,
                    title: level_after.title.clone(),
                });
            }

            touch_streak(profile, dispatcher, now, None);
            unlocked = unlock_achievements(profile, ledger, dispatcher, now)?;
            profile.persist()?;
        }

        Ok(NodeOutcome {
            newly_completed,
            xp_awarded,
            total_xp: ledger.total_xp(),
            level: ledger.level_info(),
            streak: profile.stats().learning_streak,
            unlocked_achievements: unlocked,
        })
    }

    /// Record a completed lesson. An optional 0-100 score feeds the
    /// running average.
    pub fn record_lesson(
        &self,
        lesson_id: &str,
        score: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<ActivityOutcome, EngineError> {
        validate_score("lesson_score", score)?;
        self.record_activity_inner(
            &format!("lesson:{lesson_id}"),
            self.config.progression.lesson_reward,
            score,
            now,
            |stats| stats.lessons_completed += 1,
        )
    }

    /// Record a passed quiz. A 100% score earns the perfect-quiz bonus
    /// on top of the base reward.
    pub fn record_quiz(
        &self,
        quiz_id: &str,
        score_pct: f64,
        now: DateTime<Utc>,
    ) -> Result<ActivityOutcome, EngineError> {
        validate_score("quiz_score", Some(score_pct))?;
        let perfect = score_pct >= 100.0;
        let reward = self.config.progression.quiz_reward
            + if perfect {
                self.config.progression.perfect_quiz_bonus
            } else {
                0
            };
        self.record_activity_inner(
            &format!("quiz:{quiz_id}"),
            reward,
            Some(score_pct),
            now,
            |stats| {
                stats.quizzes_completed += 1;
                if perfect {
                    stats.perfect_quizzes += 1;
                }
            },
        )
    }

    /// Record a submitted assignment.
    pub fn record_assignment(
        &self,
        assignment_id: &str,
        score: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<ActivityOutcome, EngineError> {
        validate_score("assignment_score", score)?;
        self.record_activity_inner(
            &format!("assignment:{assignment_id}"),
            self.config.progression.assignment_reward,
            score,
            now,
            |stats| stats.assignments_submitted += 1,
        )
    }

    /// Record a completed peer evaluation.
    pub fn record_peer_evaluation(
        &self,
        evaluation_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ActivityOutcome, EngineError> {
        self.record_activity_inner(
            &format!("peer-evaluation:{evaluation_id}"),
            self.config.progression.peer_evaluation_reward,
            None,
            now,
            |stats| stats.peer_evaluations += 1,
        )
    }

    /// Record a course completion. Pays the course reward exactly once
    /// per course id; repeats return `None`.
    pub fn record_course_completion(
        &self,
        course_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ActivityOutcome>, EngineError> {
        let mut guard = self.lock()?;
        let SessionInner {
            ledger,
            profile,
            dispatcher,
            ..
        } = &mut *guard;

        if profile.state().completed_courses.contains(course_id) {
            return Ok(None);
        }

        // Durable before the award, so a retry after a failed award
        // cannot pay twice.
        profile.state_mut().completed_courses.insert(course_id.to_string());
        profile.state_mut().stats.courses_completed += 1;
        profile.persist()?;

        let award = award_and_emit(
            ledger,
            dispatcher,
            self.config.progression.course_reward,
            &format!("course:{course_id}"),
            now,
        )?;
        touch_streak(profile, dispatcher, now, None);
        let unlocked = unlock_achievements(profile, ledger, dispatcher, now)?;
        profile.persist()?;

        Ok(Some(ActivityOutcome {
            xp_awarded: award.amount,
            total_xp: ledger.total_xp(),
            level: ledger.level_info(),
            streak: profile.stats().learning_streak,
            average_score: profile.stats().average_score,
            unlocked_achievements: unlocked,
        }))
    }

    /// Replace the selected skill set. Recommendations are not
    /// recomputed implicitly; call [`Self::recommend`] when rankings
    /// are wanted.
    pub fn update_selected_skills(&self, skills: FxHashSet<String>) -> Result<(), EngineError> {
        self.lock()?.profile.update_selected_skills(skills)
    }

    /// Shallow-merge a preferences update.
    pub fn update_preferences(&self, update: &PreferencesUpdate) -> Result<(), EngineError> {
        self.lock()?.profile.update_preferences(update)
    }

    /// Overwrite the named performance metric keys.
    pub fn record_performance(&self, update: &MetricsUpdate) -> Result<(), EngineError> {
        self.lock()?.profile.record_performance(update)
    }

    /// Zero XP and history. Completion sets are independent and are
    /// not touched.
    pub fn reset_progression(&self) -> Result<(), EngineError> {
        let mut guard = self.lock()?;
        guard.ledger.reset()?;
        guard.dispatcher.emit_progression_reset(&ProgressionResetEvent {});
        Ok(())
    }

    // ---- Recommendations ----

    /// Rank the catalog for this learner. State is snapshotted under
    /// the lock, then scoring runs without it; completed-course ids
    /// come from the profile, in-progress ids from the caller.
    pub fn recommend(
        &self,
        catalog: &dyn CourseCatalog,
        in_progress_course_ids: &FxHashSet<String>,
    ) -> Result<Vec<Recommendation>, EngineError> {
        let (preferences, selected_skills, completed) = {
            let guard = self.lock()?;
            let state = guard.profile.state();
            (
                state.preferences.clone(),
                state.selected_skills.clone(),
                state.completed_courses.clone(),
            )
        };

        Ok(self.engine.generate(
            &preferences,
            &selected_skills,
            catalog.courses(),
            &completed,
            in_progress_course_ids,
        ))
    }

    /// Per-factor breakdown for one course, against current state.
    pub fn explain(
        &self,
        course_id: &str,
        catalog: &dyn CourseCatalog,
        in_progress_course_ids: &FxHashSet<String>,
    ) -> Result<ScoreBreakdown, EngineError> {
        let (preferences, selected_skills, completed) = {
            let guard = self.lock()?;
            let state = guard.profile.state();
            (
                state.preferences.clone(),
                state.selected_skills.clone(),
                state.completed_courses.clone(),
            )
        };

        self.engine.explain(
            course_id,
            &preferences,
            &selected_skills,
            catalog.courses(),
            &completed,
            in_progress_course_ids,
        )
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    // ---- Read-only queries (certificate/eligibility surface) ----

    pub fn total_xp(&self) -> Result<i64, EngineError> {
        Ok(self.lock()?.ledger.total_xp())
    }

    pub fn level_info(&self) -> Result<LevelInfo, EngineError> {
        Ok(self.lock()?.ledger.level_info())
    }

    /// XP history snapshot, most-recent-first.
    pub fn xp_history(&self) -> Result<Vec<XpEvent>, EngineError> {
        Ok(self.lock()?.ledger.history().to_vec())
    }

    pub fn is_completed(&self, roadmap_id: &str, node_id: &str) -> Result<bool, EngineError> {
        Ok(self.lock()?.tracker.is_completed(roadmap_id, node_id))
    }

    pub fn completed_ids(&self, roadmap_id: &str) -> Result<FxHashSet<String>, EngineError> {
        Ok(self.lock()?.tracker.completed_ids(roadmap_id))
    }

    pub fn completion_percentage(
        &self,
        roadmap_id: &str,
        total_nodes: u32,
    ) -> Result<u8, EngineError> {
        Ok(self.lock()?.tracker.completion_percentage(roadmap_id, total_nodes))
    }

    pub fn selected_skills(&self) -> Result<FxHashSet<String>, EngineError> {
        Ok(self.lock()?.profile.selected_skills().clone())
    }

    pub fn stats(&self) -> Result<LearningStats, EngineError> {
        Ok(self.lock()?.profile.stats().clone())
    }

    pub fn metrics(&self) -> Result<PerformanceMetrics, EngineError> {
        Ok(self.lock()?.profile.metrics().clone())
    }

    pub fn recommended_difficulty(&self) -> Result<Difficulty, EngineError> {
        Ok(self.lock()?.profile.recommended_difficulty())
    }

    /// Unlocked achievement ids, sorted for stable output.
    pub fn achievements(&self) -> Result<Vec<String>, EngineError> {
        let mut ids: Vec<String> = self.lock()?.profile.state().achievements.iter().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    // ---- Internals ----

    fn record_activity_inner(
        &self,
        source: &str,
        reward: i64,
        score: Option<f64>,
        now: DateTime<Utc>,
        bump: impl FnOnce(&mut LearningStats),
    ) -> Result<ActivityOutcome, EngineError> {
        let mut guard = self.lock()?;
        let SessionInner {
            ledger,
            profile,
            dispatcher,
            ..
        } = &mut *guard;

        let award = award_and_emit(ledger, dispatcher, reward, source, now)?;
        bump(&mut profile.state_mut().stats);
        touch_streak(profile, dispatcher, now, score);
        let unlocked = unlock_achievements(profile, ledger, dispatcher, now)?;
        profile.persist()?;

        Ok(ActivityOutcome {
            xp_awarded: award.amount,
            total_xp: ledger.total_xp(),
            level: ledger.level_info(),
            streak: profile.stats().learning_streak,
            average_score: profile.stats().average_score,
            unlocked_achievements: unlocked,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionInner>, EngineError> {
        self.inner
            .lock()
            .map_err(|_| {
                EngineError::Storage(StorageError::Sqlite {
                    message: "session lock poisoned".to_string(),
                })
            })
    }
}

/// Award XP through the ledger and emit the matching events.
fn award_and_emit(
    ledger: &mut ProgressionLedger,
    dispatcher: &EventDispatcher,
    amount: i64,
    source: &str,
    now: DateTime<Utc>,
) -> Result<XpAward, EngineError> {
    let award = ledger.add_xp(amount, source, now)?;
    dispatcher.emit_xp_awarded(&XpAwardedEvent {
        amount: award.amount,
        source: source.to_string(),
        total_after: award.total_after,
    });
    if award.leveled_up() {
        dispatcher.emit_level_up(&LevelUpEvent {
            level: award.level_after.level,
            title: award.level_after.title.clone(),
        });
    }
    Ok(award)
}

/// Advance the streak/average bookkeeping and emit on change.
fn touch_streak(
    profile: &mut LearnerProfile,
    dispatcher: &EventDispatcher,
    now: DateTime<Utc>,
    score: Option<f64>,
) {
    let changed = streak::record_activity(&mut profile.state_mut().stats, now, score);
    if changed {
        dispatcher.emit_streak_changed(&StreakChangedEvent {
            streak: profile.stats().learning_streak,
        });
    }
}

/// Unlock any achievements the stats now satisfy, paying each bonus
/// through the ledger exactly once.
fn unlock_achievements(
    profile: &mut LearnerProfile,
    ledger: &mut ProgressionLedger,
    dispatcher: &EventDispatcher,
    now: DateTime<Utc>,
) -> Result<Vec<String>, EngineError> {
    let fresh = achievements::newly_unlocked(profile.stats(), &profile.state().achievements);
    let mut ids = Vec::with_capacity(fresh.len());
    for def in fresh {
        profile.state_mut().achievements.insert(def.id.to_string());
        award_and_emit(ledger, dispatcher, def.xp_bonus, &format!("achievement:{}", def.id), now)?;
        dispatcher.emit_achievement_unlocked(&AchievementUnlockedEvent {
            achievement_id: def.id.to_string(),
            xp_bonus: def.xp_bonus,
        });
        ids.push(def.id.to_string());
    }
    Ok(ids)
}

fn validate_score(metric: &'static str, score: Option<f64>) -> Result<(), ValidationError> {
    if let Some(value) = score {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(ValidationError::MetricOutOfRange { metric, value });
        }
    }
    Ok(())
}
