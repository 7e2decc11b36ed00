//! Review queue and grading handlers.

use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::config;
use crate::db::{self, reviews, schedule};
use crate::domain::{ItemId, ReviewEvent, ReviewGrade, ScheduleState};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DueQuery {
  pub limit: Option<i64>,
}

/// GET /api/review/due
pub async fn due(
  auth: AuthContext,
  State(state): State<AppState>,
  Query(query): Query<DueQuery>,
) -> Result<Json<Vec<ScheduleState>>, AppError> {
  let limit = query
    .limit
    .unwrap_or(config::DEFAULT_DUE_LIMIT)
    .clamp(1, config::MAX_DUE_LIMIT);

  let conn = db::try_lock(&state.db)?;
  let items = schedule::due_items(&conn, auth.user_id, Utc::now(), limit)?;
  Ok(Json(items))
}

#[derive(Debug, Deserialize)]
pub struct ReviewForm {
  pub item_id: String,
  pub grade: String,
}

/// POST /api/review
///
/// The grade and item id are validated before any storage call, so a bad
/// request can never leave a partial write behind.
pub async fn submit(
  auth: AuthContext,
  State(state): State<AppState>,
  Json(form): Json<ReviewForm>,
) -> Result<Json<ScheduleState>, AppError> {
  let grade =
    ReviewGrade::from_str(&form.grade).ok_or_else(|| AppError::InvalidGrade(form.grade.clone()))?;
  let item = ItemId::from_str(&form.item_id).ok_or(AppError::NotFound("item"))?;

  let mut conn = db::try_lock(&state.db)?;
  let updated = schedule::record_review(
    &mut conn,
    &state.policy,
    auth.user_id,
    &item,
    grade,
    Utc::now(),
  )?;

  tracing::debug!(
    "user {} reviewed {} as {}: next due {}",
    auth.user_id,
    updated.item_id,
    grade.as_str(),
    updated.due_at
  );
  Ok(Json(updated))
}

/// GET /api/review/history
pub async fn history(
  auth: AuthContext,
  State(state): State<AppState>,
  Query(query): Query<DueQuery>,
) -> Result<Json<Vec<ReviewEvent>>, AppError> {
  let limit = query
    .limit
    .unwrap_or(config::DEFAULT_DUE_LIMIT)
    .clamp(1, config::MAX_DUE_LIMIT);

  let conn = db::try_lock(&state.db)?;
  let events = reviews::recent_events(&conn, auth.user_id, limit)?;
  Ok(Json(events))
}

/// GET /api/review/stats
pub async fn stats(
  auth: AuthContext,
  State(state): State<AppState>,
) -> Result<Json<schedule::ReviewStats>, AppError> {
  let conn = db::try_lock(&state.db)?;
  let stats = schedule::review_stats(&conn, auth.user_id, Utc::now())?;
  Ok(Json(stats))
}
