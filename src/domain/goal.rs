use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a goal counts. Progress is always derived from recorded review
/// events, never from stored counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
  /// Reviews completed since the start of the current UTC day
  DailyReviews,
  /// Reviews completed in the trailing seven days
  WeeklyReviews,
}

impl GoalKind {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "daily_reviews" => Some(Self::DailyReviews),
      "weekly_reviews" => Some(Self::WeeklyReviews),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::DailyReviews => "daily_reviews",
      Self::WeeklyReviews => "weekly_reviews",
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
  pub id: i64,
  pub user_id: i64,
  pub title: String,
  pub kind: GoalKind,
  pub target: i64,
  pub created_at: DateTime<Utc>,
}
