//! Goal CRUD handlers with event-derived progress.

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::db::{self, goals};
use crate::domain::{Goal, GoalKind};
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/goals
pub async fn list(
  auth: AuthContext,
  State(state): State<AppState>,
) -> Result<Json<Vec<goals::GoalProgress>>, AppError> {
  let conn = db::try_lock(&state.db)?;
  let progress = goals::get_goals_with_progress(&conn, auth.user_id, Utc::now())?;
  Ok(Json(progress))
}

#[derive(Debug, Deserialize)]
pub struct CreateGoalForm {
  pub title: String,
  pub kind: String,
  pub target: i64,
}

/// POST /api/goals
pub async fn create(
  auth: AuthContext,
  State(state): State<AppState>,
  Json(form): Json<CreateGoalForm>,
) -> Result<Json<Goal>, AppError> {
  let title = form.title.trim();
  if title.is_empty() {
    return Err(AppError::BadRequest("goal title must not be empty".to_string()));
  }
  let kind = GoalKind::from_str(&form.kind)
    .ok_or_else(|| AppError::BadRequest(format!("unknown goal kind: {:?}", form.kind)))?;
  if form.target <= 0 {
    return Err(AppError::BadRequest("goal target must be positive".to_string()));
  }

  let conn = db::try_lock(&state.db)?;
  let goal = goals::insert_goal(&conn, auth.user_id, title, kind, form.target, Utc::now())?;
  Ok(Json(goal))
}

/// DELETE /api/goals/{id}
pub async fn remove(
  auth: AuthContext,
  State(state): State<AppState>,
  Path(goal_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
  let conn = db::try_lock(&state.db)?;
  goals::delete_goal(&conn, auth.user_id, goal_id)?;
  Ok(Json(serde_json::json!({ "ok": true })))
}
