//! The learner profile component: skills, preferences, metrics, stats.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use stride_core::course::Difficulty;
use stride_core::errors::{EngineError, StorageError};
use stride_core::profile::{
    LearnerPreferences, LearningStats, MetricsUpdate, PerformanceMetrics, PreferencesUpdate,
    ProfileState,
};
use stride_storage::{codec, keys, PersistentStore};

/// Owns the persisted learner profile. Mutations are write-through;
/// none of them trigger recommendation recomputes. Callers re-invoke
/// the engine when they want fresh rankings.
pub struct LearnerProfile {
    state: ProfileState,
    store: Arc<dyn PersistentStore>,
}

impl LearnerProfile {
    /// Load the persisted profile; absent or corrupt state seeds
    /// defaults.
    pub fn load(store: Arc<dyn PersistentStore>) -> Result<Self, EngineError> {
        let state: ProfileState = codec::load_or_default(store.as_ref(), keys::LEARNER_PROFILE)?;
        Ok(Self { state, store })
    }

    /// Replace the selected skill set.
    pub fn update_selected_skills(&mut self, skills: FxHashSet<String>) -> Result<(), EngineError> {
        self.state.selected_skills = skills;
        self.persist()?;
        Ok(())
    }

    /// Shallow-merge a preference update; unspecified fields keep their
    /// prior values.
    pub fn update_preferences(&mut self, update: &PreferencesUpdate) -> Result<(), EngineError> {
        self.state.preferences.merge(update);
        self.persist()?;
        Ok(())
    }

    /// Overwrite the named performance metric keys. Out-of-range
    /// success rates are rejected before any mutation.
    pub fn record_performance(&mut self, update: &MetricsUpdate) -> Result<(), EngineError> {
        update.validate()?;
        self.state.metrics.merge(update);
        self.persist()?;
        Ok(())
    }

    /// Difficulty suggested by observed success rates. Derived on every
    /// call, never cached.
    pub fn recommended_difficulty(&self) -> Difficulty {
        self.state.metrics.recommended_difficulty()
    }

    pub fn selected_skills(&self) -> &FxHashSet<String> {
        &self.state.selected_skills
    }

    pub fn preferences(&self) -> &LearnerPreferences {
        &self.state.preferences
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.state.metrics
    }

    pub fn stats(&self) -> &LearningStats {
        &self.state.stats
    }

    pub fn state(&self) -> &ProfileState {
        &self.state
    }

    /// Mutable access for the session facade (streak bookkeeping,
    /// achievement unlocks, course completion). Callers must persist
    /// afterwards.
    pub(crate) fn state_mut(&mut self) -> &mut ProfileState {
        &mut self.state
    }

    pub(crate) fn persist(&self) -> Result<(), StorageError> {
        codec::save(self.store.as_ref(), keys::LEARNER_PROFILE, &self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_core::profile::Pace;
    use stride_storage::MemoryStore;

    fn profile() -> LearnerProfile {
        LearnerProfile::load(Arc::new(MemoryStore::new())).unwrap()
    }

    fn skills(names: &[&str]) -> FxHashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_are_seeded_on_first_session() {
        let profile = profile();
        assert!(profile.selected_skills().is_empty());
        assert_eq!(profile.preferences().difficulty, Difficulty::Intermediate);
        assert_eq!(profile.preferences().session_duration_minutes, 60);
        assert_eq!(profile.recommended_difficulty(), Difficulty::Beginner);
    }

    #[test]
    fn skills_are_replaced_not_merged() {
        let mut profile = profile();
        profile.update_selected_skills(skills(&["python", "sql"])).unwrap();
        profile.update_selected_skills(skills(&["rust"])).unwrap();

        assert_eq!(profile.selected_skills(), &skills(&["rust"]));
    }

    #[test]
    fn preference_update_merges() {
        let mut profile = profile();
        profile
            .update_preferences(&PreferencesUpdate {
                pace: Some(Pace::Fast),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(profile.preferences().pace, Pace::Fast);
        assert_eq!(profile.preferences().difficulty, Difficulty::Intermediate);
    }

    #[test]
    fn out_of_range_metric_is_rejected_without_mutation() {
        let mut profile = profile();
        let err = profile
            .record_performance(&MetricsUpdate {
                quiz_success_rate: Some(150.0),
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(profile.metrics().quiz_success_rate, 0.0);
    }

    #[test]
    fn profile_survives_reload() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut profile = LearnerProfile::load(store.clone()).unwrap();
            profile.update_selected_skills(skills(&["python"])).unwrap();
            profile
                .record_performance(&MetricsUpdate {
                    quiz_success_rate: Some(88.0),
                    challenge_success_rate: Some(92.0),
                    ..Default::default()
                })
                .unwrap();
        }

        let profile = LearnerProfile::load(store).unwrap();
        assert_eq!(profile.selected_skills(), &skills(&["python"]));
        assert_eq!(profile.recommended_difficulty(), Difficulty::Advanced);
    }

    #[test]
    fn corrupt_profile_loads_as_defaults() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::LEARNER_PROFILE, b"<html>").unwrap();

        let profile = LearnerProfile::load(store).unwrap();
        assert!(profile.selected_skills().is_empty());
        assert_eq!(profile.preferences().pace, Pace::Moderate);
    }
}
