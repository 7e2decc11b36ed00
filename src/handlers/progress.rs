//! Overall progress summary.

use axum::Json;
use axum::extract::State;
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::auth::AuthContext;
use crate::db::{self, reviews, schedule};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProgressSummary {
  #[serde(flatten)]
  pub review: schedule::ReviewStats,
  pub attempts_7d: i64,
  pub correct_7d: i64,
  pub accuracy_7d: f64,
  pub courses: Vec<schedule::CourseProgress>,
}

/// GET /api/progress
pub async fn summary(
  auth: AuthContext,
  State(state): State<AppState>,
) -> Result<Json<ProgressSummary>, AppError> {
  let now = Utc::now();
  let conn = db::try_lock(&state.db)?;

  let review = schedule::review_stats(&conn, auth.user_id, now)?;
  let (attempts_7d, correct_7d) = reviews::accuracy_since(&conn, auth.user_id, now - Duration::days(7))?;
  let courses = schedule::course_breakdown(&conn, auth.user_id)?;

  let accuracy_7d = if attempts_7d > 0 {
    correct_7d as f64 / attempts_7d as f64
  } else {
    0.0
  };

  Ok(Json(ProgressSummary {
    review,
    attempts_7d,
    correct_7d,
    accuracy_7d,
    courses,
  }))
}
