//! End-to-end tests for the learner session: exactly-once completion,
//! XP invariants, streaks, recommendations, achievements, reset
//! independence, corrupt-state recovery, and persistence-failure
//! surfacing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;

use stride_core::config::StrideConfig;
use stride_core::course::{Course, Difficulty};
use stride_core::errors::EngineError;
use stride_core::events::{LearnerEventHandler, LevelUpEvent, NodeCompletedEvent, XpAwardedEvent};
use stride_core::profile::PreferencesUpdate;
use stride_engine::{LearnerSession, StaticCatalog};
use stride_storage::{keys, MemoryStore, PersistentStore};

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn day1() -> DateTime<Utc> {
    ts("2024-03-10T10:00:00Z")
}

fn day2() -> DateTime<Utc> {
    ts("2024-03-11T10:00:00Z")
}

fn open_session(store: Arc<MemoryStore>) -> LearnerSession {
    LearnerSession::open(store, StrideConfig::default()).unwrap()
}

fn skills(names: &[&str]) -> FxHashSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn course(id: &str, skill_tags: &[&str], difficulty: Difficulty, popularity: f64) -> Course {
    Course {
        id: id.to_string(),
        title: id.to_string(),
        skills: skill_tags.iter().map(|s| s.to_string()).collect(),
        difficulty,
        popularity,
        ..Default::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// COMPLETION & XP
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn node_completion_is_idempotent_and_awards_once() {
    let session = open_session(Arc::new(MemoryStore::new()));

    let first = session.complete_node("rust", "ownership", day1()).unwrap();
    let second = session.complete_node("rust", "ownership", day1()).unwrap();

    assert!(first.newly_completed);
    assert_eq!(first.xp_awarded, 50);
    assert!(!second.newly_completed);
    assert_eq!(second.xp_awarded, 0);
    assert_eq!(session.total_xp().unwrap(), 50);
    assert_eq!(session.xp_history().unwrap().len(), 1);
}

#[test]
fn total_xp_equals_sum_of_history() {
    let session = open_session(Arc::new(MemoryStore::new()));

    session.complete_node("rust", "intro", day1()).unwrap();
    session.record_lesson("l1", Some(80.0), day1()).unwrap();
    session.record_quiz("q1", 90.0, day1()).unwrap();
    session.record_assignment("a1", None, day1()).unwrap();
    session.record_peer_evaluation("p1", day1()).unwrap();

    let history = session.xp_history().unwrap();
    let sum: i64 = history.iter().map(|e| e.amount).sum();
    assert_eq!(session.total_xp().unwrap(), sum);
    // node 50 + lesson 25 + quiz 50 + assignment 75 + peer 50 = 250.
    assert_eq!(sum, 250);
    assert_eq!(history.len(), 5);
    // Most recent first, with consistent running totals.
    assert_eq!(history[0].total_after, 250);
    assert!(history.windows(2).all(|w| w[0].total_after > w[1].total_after));
}

#[test]
fn perfect_quiz_earns_the_bonus() {
    let session = open_session(Arc::new(MemoryStore::new()));
    let outcome = session.record_quiz("q1", 100.0, day1()).unwrap();
    assert_eq!(outcome.xp_awarded, 150);
}

#[test]
fn out_of_range_scores_are_rejected_without_mutation() {
    let session = open_session(Arc::new(MemoryStore::new()));

    assert!(matches!(
        session.record_quiz("q1", 150.0, day1()).unwrap_err(),
        EngineError::Validation(_)
    ));
    assert!(matches!(
        session.record_lesson("l1", Some(-5.0), day1()).unwrap_err(),
        EngineError::Validation(_)
    ));

    assert_eq!(session.total_xp().unwrap(), 0);
    assert!(session.xp_history().unwrap().is_empty());
    assert_eq!(session.stats().unwrap().quizzes_completed, 0);
}

#[test]
fn completion_percentage_tracks_progress() {
    let session = open_session(Arc::new(MemoryStore::new()));

    assert_eq!(session.completion_percentage("rust", 0).unwrap(), 0);
    assert_eq!(session.completion_percentage("rust", 4).unwrap(), 0);

    session.complete_node("rust", "a", day1()).unwrap();
    session.complete_node("rust", "b", day1()).unwrap();
    session.complete_node("rust", "c", day1()).unwrap();

    assert_eq!(session.completion_percentage("rust", 4).unwrap(), 75);
    assert!(session.is_completed("rust", "a").unwrap());
    assert_eq!(session.completed_ids("rust").unwrap().len(), 3);
}

#[test]
fn level_ups_follow_the_threshold_table() {
    let session = open_session(Arc::new(MemoryStore::new()));

    // Two nodes: 100 XP total crosses the Student threshold.
    session.complete_node("rust", "a", day1()).unwrap();
    let outcome = session.complete_node("rust", "b", day1()).unwrap();

    assert_eq!(outcome.level.level, 2);
    assert_eq!(outcome.level.title, "Student");
}

// ═══════════════════════════════════════════════════════════════════════════
// STREAKS & RUNNING AVERAGE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn consecutive_days_extend_the_streak() {
    let session = open_session(Arc::new(MemoryStore::new()));

    assert_eq!(session.complete_node("r", "n1", day1()).unwrap().streak, 1);
    // Same day again: no inflation.
    assert_eq!(session.complete_node("r", "n2", day1()).unwrap().streak, 1);
    // Next day extends.
    assert_eq!(session.complete_node("r", "n3", day2()).unwrap().streak, 2);
    // A three-day gap resets.
    let after_gap = session
        .complete_node("r", "n4", ts("2024-03-14T08:00:00Z"))
        .unwrap();
    assert_eq!(after_gap.streak, 1);
}

#[test]
fn running_average_matches_the_closed_form() {
    let session = open_session(Arc::new(MemoryStore::new()));

    for (i, score) in [80.0, 80.0, 80.0].iter().enumerate() {
        session
            .record_lesson(&format!("l{i}"), Some(*score), day1())
            .unwrap();
    }
    let outcome = session.record_lesson("l4", Some(100.0), day1()).unwrap();

    // (80*3 + 100) / 4 = 85.
    assert_eq!(outcome.average_score, 85.0);
    assert_eq!(session.stats().unwrap().score_samples, 4);
}

// ═══════════════════════════════════════════════════════════════════════════
// RECOMMENDATIONS THROUGH THE SESSION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn cold_start_recommends_popular_beginner_courses() {
    let session = open_session(Arc::new(MemoryStore::new()));
    let catalog = StaticCatalog::new(vec![
        course("adv", &["rust"], Difficulty::Advanced, 99.0),
        course("b-low", &[], Difficulty::Beginner, 70.0),
        course("b-top", &[], Difficulty::Beginner, 96.0),
        course("b-mid", &[], Difficulty::Beginner, 85.0),
        course("b-high", &[], Difficulty::Beginner, 90.0),
    ]);

    let recs = session.recommend(&catalog, &FxHashSet::default()).unwrap();
    let ids: Vec<&str> = recs.iter().map(|r| r.course.id.as_str()).collect();
    assert_eq!(ids, vec!["b-top", "b-high", "b-mid"]);
}

#[test]
fn scoring_scenario_through_the_session() {
    let session = open_session(Arc::new(MemoryStore::new()));
    session.update_selected_skills(skills(&["python"])).unwrap();
    session
        .update_preferences(&PreferencesUpdate {
            difficulty: Some(Difficulty::Beginner),
            ..Default::default()
        })
        .unwrap();

    let catalog = StaticCatalog::new(vec![course("c1", &["python"], Difficulty::Beginner, 90.0)]);

    let recs = session.recommend(&catalog, &FxHashSet::default()).unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].course.id, "c1");
    assert_eq!(recs[0].score, 84.0);

    let breakdown = session.explain("c1", &catalog, &FxHashSet::default()).unwrap();
    assert_eq!(breakdown.total, 84.0);
    assert_eq!(breakdown.exclusion, None);
}

#[test]
fn completing_a_course_excludes_it_from_recommendations() {
    let session = open_session(Arc::new(MemoryStore::new()));
    session.update_selected_skills(skills(&["python"])).unwrap();
    session
        .update_preferences(&PreferencesUpdate {
            difficulty: Some(Difficulty::Beginner),
            ..Default::default()
        })
        .unwrap();

    let catalog = StaticCatalog::new(vec![course("c1", &["python"], Difficulty::Beginner, 90.0)]);
    session.record_course_completion("c1", day1()).unwrap();

    let recs = session.recommend(&catalog, &FxHashSet::default()).unwrap();
    assert!(recs.is_empty());

    let breakdown = session.explain("c1", &catalog, &FxHashSet::default()).unwrap();
    assert_eq!(breakdown.exclusion, Some(-100.0));
    assert_eq!(breakdown.total, -100.0);
}

#[test]
fn in_progress_courses_are_excluded_via_caller_ids() {
    let session = open_session(Arc::new(MemoryStore::new()));
    session.update_selected_skills(skills(&["python"])).unwrap();

    let catalog = StaticCatalog::new(vec![course("c1", &["python"], Difficulty::Beginner, 90.0)]);
    let recs = session.recommend(&catalog, &skills(&["c1"])).unwrap();
    assert!(recs.is_empty());
}

#[test]
fn unknown_course_in_explain_is_not_found() {
    let session = open_session(Arc::new(MemoryStore::new()));
    let catalog = StaticCatalog::default();
    let err = session
        .explain("ghost", &catalog, &FxHashSet::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

// ═══════════════════════════════════════════════════════════════════════════
// ACHIEVEMENTS & COURSE LIFECYCLE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn course_completion_pays_exactly_once() {
    let session = open_session(Arc::new(MemoryStore::new()));

    let first = session.record_course_completion("c1", day1()).unwrap();
    let second = session.record_course_completion("c1", day1()).unwrap();

    let outcome = first.unwrap();
    assert_eq!(outcome.xp_awarded, 500);
    assert!(second.is_none());
    assert_eq!(session.stats().unwrap().courses_completed, 1);
    // 500 course XP + 100 first_course achievement bonus.
    assert_eq!(session.total_xp().unwrap(), 600);
    assert_eq!(outcome.unlocked_achievements, vec!["first_course".to_string()]);
}

#[test]
fn quiz_master_unlocks_after_five_perfect_quizzes() {
    let session = open_session(Arc::new(MemoryStore::new()));

    for i in 0..4 {
        let outcome = session.record_quiz(&format!("q{i}"), 100.0, day1()).unwrap();
        assert!(outcome.unlocked_achievements.is_empty());
    }
    let fifth = session.record_quiz("q4", 100.0, day1()).unwrap();
    assert_eq!(fifth.unlocked_achievements, vec!["quiz_master".to_string()]);

    // A sixth perfect quiz must not re-award the bonus.
    let sixth = session.record_quiz("q5", 100.0, day1()).unwrap();
    assert!(sixth.unlocked_achievements.is_empty());

    // 6 quizzes × 150 XP + 250 bonus once.
    assert_eq!(session.total_xp().unwrap(), 6 * 150 + 250);
    assert_eq!(session.achievements().unwrap(), vec!["quiz_master".to_string()]);
}

#[test]
fn streak_warrior_unlocks_on_the_seventh_day() {
    let session = open_session(Arc::new(MemoryStore::new()));

    let mut unlocked = Vec::new();
    for day in 10..17 {
        let now = ts(&format!("2024-03-{day}T09:00:00Z"));
        let outcome = session.record_lesson(&format!("l{day}"), None, now).unwrap();
        unlocked.extend(outcome.unlocked_achievements);
    }

    assert_eq!(session.stats().unwrap().learning_streak, 7);
    assert!(unlocked.contains(&"streak_warrior".to_string()));
}

// ═══════════════════════════════════════════════════════════════════════════
// RESET, RECOVERY, DURABILITY
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn reset_zeroes_xp_but_keeps_completions() {
    let session = open_session(Arc::new(MemoryStore::new()));

    session.complete_node("rust", "a", day1()).unwrap();
    session.complete_node("rust", "b", day1()).unwrap();
    session.reset_progression().unwrap();

    assert_eq!(session.total_xp().unwrap(), 0);
    assert!(session.xp_history().unwrap().is_empty());
    // Independent lifecycle: completions survive the XP reset.
    assert_eq!(session.completion_percentage("rust", 2).unwrap(), 100);
    assert!(session.is_completed("rust", "a").unwrap());
}

#[test]
fn state_survives_session_reopen() {
    let store = Arc::new(MemoryStore::new());
    {
        let session = open_session(store.clone());
        session.complete_node("rust", "a", day1()).unwrap();
        session.update_selected_skills(skills(&["rust"])).unwrap();
        session.record_quiz("q1", 100.0, day1()).unwrap();
    }

    let session = open_session(store);
    assert_eq!(session.total_xp().unwrap(), 200);
    assert!(session.is_completed("rust", "a").unwrap());
    assert_eq!(session.selected_skills().unwrap(), skills(&["rust"]));
    assert_eq!(session.stats().unwrap().perfect_quizzes, 1);
}

#[test]
fn corrupt_payloads_recover_to_defaults() {
    let store = Arc::new(MemoryStore::new());
    store.set(keys::PROGRESSION_STATE, b"\xff\xfe").unwrap();
    store.set(keys::COMPLETION_SETS, b"{{{{").unwrap();
    store.set(keys::LEARNER_PROFILE, b"null").unwrap();

    let session = open_session(store);
    assert_eq!(session.total_xp().unwrap(), 0);
    assert_eq!(session.completion_percentage("rust", 10).unwrap(), 0);
    assert!(session.selected_skills().unwrap().is_empty());

    // The session is fully operational after recovery.
    let outcome = session.complete_node("rust", "a", day1()).unwrap();
    assert!(outcome.newly_completed);
}

#[test]
fn persistence_failure_is_surfaced_and_never_double_awards() {
    let store = Arc::new(MemoryStore::new());
    let session = open_session(store.clone());

    store.set_fail_writes(true);
    let err = session.complete_node("rust", "a", day1()).unwrap_err();
    assert!(matches!(err, EngineError::Storage(_)));

    // The write failed before any XP award; once the store recovers, a
    // retry is a no-op (completion stuck in memory) and XP stays
    // consistent with at-most-once awarding.
    store.set_fail_writes(false);
    let retry = session.complete_node("rust", "a", day1()).unwrap();
    assert!(!retry.newly_completed);
    assert_eq!(session.total_xp().unwrap(), 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct CountingHandler {
    xp: AtomicUsize,
    nodes: AtomicUsize,
    level_ups: AtomicUsize,
}

impl LearnerEventHandler for CountingHandler {
    fn on_xp_awarded(&self, _event: &XpAwardedEvent) {
        self.xp.fetch_add(1, Ordering::SeqCst);
    }
    fn on_node_completed(&self, _event: &NodeCompletedEvent) {
        self.nodes.fetch_add(1, Ordering::SeqCst);
    }
    fn on_level_up(&self, _event: &LevelUpEvent) {
        self.level_ups.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn events_fire_for_new_completions_only() {
    let session = open_session(Arc::new(MemoryStore::new()));
    let handler = Arc::new(CountingHandler::default());
    session.register_handler(handler.clone()).unwrap();

    session.complete_node("rust", "a", day1()).unwrap();
    session.complete_node("rust", "a", day1()).unwrap();
    session.complete_node("rust", "b", day1()).unwrap();

    assert_eq!(handler.nodes.load(Ordering::SeqCst), 2);
    assert_eq!(handler.xp.load(Ordering::SeqCst), 2);
    // 100 XP crosses the Student threshold exactly once.
    assert_eq!(handler.level_ups.load(Ordering::SeqCst), 1);
}
