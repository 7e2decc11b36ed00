//! Deck and flashcard CRUD handlers.

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::AuthContext;
use crate::db::{self, catalog, decks};
use crate::domain::{Deck, Flashcard};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateDeckForm {
  pub title: String,
  pub course_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeckDetail {
  #[serde(flatten)]
  pub deck: Deck,
  pub cards: Vec<Flashcard>,
}

/// GET /api/decks
pub async fn list(
  auth: AuthContext,
  State(state): State<AppState>,
) -> Result<Json<Vec<decks::DeckSummary>>, AppError> {
  let conn = db::try_lock(&state.db)?;
  let summaries = decks::get_decks(&conn, auth.user_id)?;
  Ok(Json(summaries))
}

/// POST /api/decks
pub async fn create(
  auth: AuthContext,
  State(state): State<AppState>,
  Json(form): Json<CreateDeckForm>,
) -> Result<Json<Deck>, AppError> {
  let title = form.title.trim();
  if title.is_empty() {
    return Err(AppError::BadRequest("deck title must not be empty".to_string()));
  }

  let conn = db::try_lock(&state.db)?;

  // A course link must point at a real course
  if let Some(course_id) = form.course_id.as_deref() {
    if catalog::get_course(&conn, course_id)?.is_none() {
      return Err(AppError::NotFound("course"));
    }
  }

  let deck = decks::insert_deck(&conn, auth.user_id, title, form.course_id.as_deref(), Utc::now())?;
  Ok(Json(deck))
}

/// GET /api/decks/{id}
pub async fn detail(
  auth: AuthContext,
  State(state): State<AppState>,
  Path(deck_id): Path<i64>,
) -> Result<Json<DeckDetail>, AppError> {
  let conn = db::try_lock(&state.db)?;

  let deck = decks::get_deck(&conn, auth.user_id, deck_id)?.ok_or(AppError::NotFound("deck"))?;
  let cards = decks::get_cards(&conn, auth.user_id, deck_id)?;

  Ok(Json(DeckDetail { deck, cards }))
}

/// DELETE /api/decks/{id}
pub async fn remove(
  auth: AuthContext,
  State(state): State<AppState>,
  Path(deck_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
  let mut conn = db::try_lock(&state.db)?;
  decks::delete_deck(&mut conn, auth.user_id, deck_id)?;
  Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Debug, Deserialize)]
pub struct CardForm {
  pub front: String,
  pub back: String,
}

/// POST /api/decks/{id}/cards
pub async fn add_card(
  auth: AuthContext,
  State(state): State<AppState>,
  Path(deck_id): Path<i64>,
  Json(form): Json<CardForm>,
) -> Result<Json<Flashcard>, AppError> {
  let front = form.front.trim();
  let back = form.back.trim();
  if front.is_empty() || back.is_empty() {
    return Err(AppError::BadRequest("card front and back must not be empty".to_string()));
  }

  let mut conn = db::try_lock(&state.db)?;
  let card = decks::insert_card(&mut conn, auth.user_id, deck_id, front, back, Utc::now())?;
  Ok(Json(card))
}

/// DELETE /api/decks/{id}/cards/{card_id}
pub async fn remove_card(
  auth: AuthContext,
  State(state): State<AppState>,
  Path((deck_id, card_id)): Path<(i64, i64)>,
) -> Result<Json<serde_json::Value>, AppError> {
  let mut conn = db::try_lock(&state.db)?;
  decks::delete_card(&mut conn, auth.user_id, deck_id, card_id)?;
  Ok(Json(serde_json::json!({ "ok": true })))
}
