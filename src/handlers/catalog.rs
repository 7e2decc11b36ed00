//! Course catalog and practice-sample handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::auth::AuthContext;
use crate::config;
use crate::db::{self, catalog};
use crate::domain::{Course, Question, Topic, Unit};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UnitOutline {
  #[serde(flatten)]
  pub unit: Unit,
  pub topics: Vec<Topic>,
}

#[derive(Debug, Serialize)]
pub struct CourseOutline {
  #[serde(flatten)]
  pub course: Course,
  pub units: Vec<UnitOutline>,
  pub question_count: i64,
}

/// GET /api/courses
pub async fn list_courses(
  _auth: AuthContext,
  State(state): State<AppState>,
) -> Result<Json<Vec<Course>>, AppError> {
  let conn = db::try_lock(&state.db)?;
  let courses = catalog::get_courses(&conn)?;
  Ok(Json(courses))
}

/// GET /api/courses/{id}
pub async fn course_detail(
  _auth: AuthContext,
  State(state): State<AppState>,
  Path(course_id): Path<String>,
) -> Result<Json<CourseOutline>, AppError> {
  let conn = db::try_lock(&state.db)?;

  let course = catalog::get_course(&conn, &course_id)?.ok_or(AppError::NotFound("course"))?;

  let mut units = Vec::new();
  for unit in catalog::get_units(&conn, &course_id)? {
    let topics = catalog::get_topics(&conn, &course_id, &unit.id)?;
    units.push(UnitOutline { unit, topics });
  }

  let question_count = catalog::count_questions(&conn, &course_id)?;

  Ok(Json(CourseOutline {
    course,
    units,
    question_count,
  }))
}

#[derive(Debug, Deserialize)]
pub struct PracticeQuery {
  pub limit: Option<usize>,
}

/// GET /api/courses/{id}/practice
///
/// A shuffled sample of the course's questions. Grading happens through
/// POST /api/review with the question's item id.
pub async fn practice(
  _auth: AuthContext,
  State(state): State<AppState>,
  Path(course_id): Path<String>,
  Query(query): Query<PracticeQuery>,
) -> Result<Json<Vec<Question>>, AppError> {
  let limit = query.limit.unwrap_or(config::DEFAULT_PRACTICE_LIMIT).max(1);

  let conn = db::try_lock(&state.db)?;
  if catalog::get_course(&conn, &course_id)?.is_none() {
    return Err(AppError::NotFound("course"));
  }

  let mut questions = catalog::get_questions_for_course(&conn, &course_id)?;
  drop(conn);

  questions.shuffle(&mut rand::rng());
  questions.truncate(limit);
  Ok(Json(questions))
}
