use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-owned collection of flashcards, optionally linked to a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
  pub id: i64,
  pub user_id: i64,
  pub title: String,
  pub course_id: Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
  pub id: i64,
  pub deck_id: i64,
  pub front: String,
  pub back: String,
  pub created_at: DateTime<Utc>,
}
