//! Review scheduling: next interval, ease factor, and due date.
//!
//! One policy-parameterized implementation shared by every call site —
//! flashcard reviews and question reviews go through the same arithmetic.
//! `compute_next` is pure and deterministic so it can be tested with a
//! fixed clock.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::domain::{ReviewGrade, ScheduleState};

pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const MAX_EASE_FACTOR: f64 = 2.5;

/// Tunable scheduling constants. Loaded from the `[scheduler]` section of
/// config.toml; any omitted field keeps its default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerPolicy {
  /// Fixed first-review intervals per grade, in days
  pub first_interval_again: f64,
  pub first_interval_hard: f64,
  pub first_interval_good: f64,
  pub first_interval_easy: f64,

  /// Interval multiplier for Hard on subsequent reviews
  pub hard_multiplier: f64,
  /// Extra multiplier applied on top of the ease factor for Easy
  pub easy_bonus: f64,

  /// Ease-factor deltas per grade
  pub again_ease_penalty: f64,
  pub hard_ease_penalty: f64,
  pub easy_ease_bonus: f64,

  /// Interval bounds, in days
  pub min_interval_days: f64,
  pub max_interval_days: f64,
}

impl Default for SchedulerPolicy {
  fn default() -> Self {
    Self {
      first_interval_again: 1.0,
      first_interval_hard: 2.0,
      first_interval_good: 3.0,
      first_interval_easy: 5.0,
      hard_multiplier: 1.2,
      easy_bonus: 1.5,
      again_ease_penalty: 0.2,
      hard_ease_penalty: 0.15,
      easy_ease_bonus: 0.15,
      min_interval_days: 1.0,
      max_interval_days: 365.0,
    }
  }
}

impl SchedulerPolicy {
  fn first_interval(&self, grade: ReviewGrade) -> f64 {
    match grade {
      ReviewGrade::Again => self.first_interval_again,
      ReviewGrade::Hard => self.first_interval_hard,
      ReviewGrade::Good => self.first_interval_good,
      ReviewGrade::Easy => self.first_interval_easy,
    }
  }
}

/// Compute the state after grading a review at `now`.
///
/// First reviews (`repetitions == 0`) use fixed per-grade intervals and
/// leave the ease factor untouched. Subsequent reviews derive the interval
/// multiplicatively and round it to whole days before clamping.
pub fn compute_next(
  policy: &SchedulerPolicy,
  state: &ScheduleState,
  grade: ReviewGrade,
  now: DateTime<Utc>,
) -> ScheduleState {
  let (interval, ease_factor) = if state.repetitions == 0 {
    (policy.first_interval(grade), state.ease_factor)
  } else {
    match grade {
      ReviewGrade::Again => (
        policy.min_interval_days,
        state.ease_factor - policy.again_ease_penalty,
      ),
      ReviewGrade::Hard => (
        (state.interval_days * policy.hard_multiplier).round(),
        state.ease_factor - policy.hard_ease_penalty,
      ),
      ReviewGrade::Good => (
        (state.interval_days * state.ease_factor).round(),
        state.ease_factor,
      ),
      ReviewGrade::Easy => (
        (state.interval_days * state.ease_factor * policy.easy_bonus).round(),
        state.ease_factor + policy.easy_ease_bonus,
      ),
    }
  };

  let interval_days = interval.clamp(policy.min_interval_days, policy.max_interval_days);
  let ease_factor = ease_factor.clamp(MIN_EASE_FACTOR, MAX_EASE_FACTOR);

  // Seconds rather than whole days so fractional intervals stay exact
  let due_at = now + Duration::seconds((interval_days * 86_400.0).round() as i64);

  ScheduleState {
    item_id: state.item_id.clone(),
    interval_days,
    ease_factor,
    repetitions: state.repetitions + 1,
    last_reviewed_at: Some(now),
    due_at,
    revision: state.revision,
  }
}
