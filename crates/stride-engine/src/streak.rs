//! Consecutive-day streaks and the running score average.

use chrono::{DateTime, NaiveDate, Utc};

use stride_core::profile::LearningStats;

/// Advance a streak given the previous active date and today, both
/// truncated to midnight.
///
/// No prior activity starts the streak at 1. A same-day repeat leaves
/// it unchanged (multiple completions in one day do not inflate it), a
/// one-day gap extends it, and anything longer resets it to 1. A
/// negative gap (clock skew) is treated as same-day.
pub fn advance(last_active: Option<NaiveDate>, today: NaiveDate, streak: u32) -> u32 {
    let Some(last) = last_active else {
        return 1;
    };
    let day_diff = (today - last).num_days();
    if day_diff == 1 {
        streak + 1
    } else if day_diff > 1 {
        1
    } else {
        streak
    }
}

/// Fold a new score into a running average without ever dividing by
/// zero: the first sample becomes the average.
pub fn running_average(old_avg: f64, old_count: u64, new_score: f64) -> f64 {
    (old_avg * old_count as f64 + new_score) / (old_count as f64 + 1.0)
}

/// Apply one qualifying activity to the stats: advance the streak,
/// stamp `last_active`, and fold in the score when one was supplied.
/// Returns `true` when the streak value changed.
pub fn record_activity(stats: &mut LearningStats, now: DateTime<Utc>, score: Option<f64>) -> bool {
    let today = now.date_naive();
    let new_streak = advance(
        stats.last_active.map(|t| t.date_naive()),
        today,
        stats.learning_streak,
    );
    let changed = new_streak != stats.learning_streak;
    stats.learning_streak = new_streak;
    stats.last_active = Some(now);

    if let Some(score) = score {
        stats.average_score = running_average(stats.average_score, stats.score_samples, score);
        stats.score_samples += 1;
    }
    changed
}
