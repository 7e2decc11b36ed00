use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::QuestionRef;

/// Default ease factor for an item that has never been reviewed
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Default interval for an item that has never been reviewed
pub const DEFAULT_INTERVAL_DAYS: f64 = 1.0;

/// The single four-level grade used by every review surface.
///
/// The question-review and flashcard subsystems historically carried two
/// parallel enumerations for the same four concepts; `"medium"` survives
/// only as a parse alias for [`ReviewGrade::Good`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewGrade {
  Again,
  Hard,
  Good,
  Easy,
}

impl ReviewGrade {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "again" => Some(Self::Again),
      "hard" => Some(Self::Hard),
      "good" | "medium" => Some(Self::Good),
      "easy" => Some(Self::Easy),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Again => "again",
      Self::Hard => "hard",
      Self::Good => "good",
      Self::Easy => "easy",
    }
  }

  pub fn is_correct(&self) -> bool {
    !matches!(self, Self::Again)
  }
}

/// Reference to a schedulable item: a flashcard or a catalog question.
///
/// The string encoding (`card:<id>`, `question:<course>:<unit>:<topic>:<q>`)
/// is the key column in the schedule-state table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemId {
  Card(i64),
  Question(QuestionRef),
}

impl ItemId {
  pub fn from_str(s: &str) -> Option<Self> {
    let (kind, rest) = s.split_once(':')?;
    match kind {
      "card" => rest.parse::<i64>().ok().filter(|id| *id > 0).map(Self::Card),
      "question" => {
        let segments: Vec<&str> = rest.split(':').collect();
        if segments.len() != 4 || segments.iter().any(|seg| seg.is_empty()) {
          return None;
        }
        Some(Self::Question(QuestionRef {
          course_id: segments[0].to_string(),
          unit_id: segments[1].to_string(),
          topic_id: segments[2].to_string(),
          question_id: segments[3].to_string(),
        }))
      }
      _ => None,
    }
  }
}

impl std::fmt::Display for ItemId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Card(id) => write!(f, "card:{}", id),
      Self::Question(q) => write!(
        f,
        "question:{}:{}:{}:{}",
        q.course_id, q.unit_id, q.topic_id, q.question_id
      ),
    }
  }
}

/// Per-item scheduling state.
///
/// Invariants maintained by the scheduler and store:
/// - `interval_days` stays within `(0, max]`
/// - `ease_factor` stays within `[1.3, 2.5]`
/// - `due_at == last_reviewed_at + interval_days` once reviewed
/// - an item with no `last_reviewed_at` is always due
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleState {
  pub item_id: String,
  pub interval_days: f64,
  pub ease_factor: f64,
  pub repetitions: i64,
  pub last_reviewed_at: Option<DateTime<Utc>>,
  pub due_at: DateTime<Utc>,
  /// Optimistic-concurrency token, bumped on every persisted update
  pub revision: i64,
}

impl ScheduleState {
  /// State for an item that has never been reviewed. `due_at` is the
  /// registration time; never-reviewed items are due regardless.
  pub fn fresh(item_id: String, now: DateTime<Utc>) -> Self {
    Self {
      item_id,
      interval_days: DEFAULT_INTERVAL_DAYS,
      ease_factor: DEFAULT_EASE_FACTOR,
      repetitions: 0,
      last_reviewed_at: None,
      due_at: now,
      revision: 0,
    }
  }

  pub fn is_new(&self) -> bool {
    self.last_reviewed_at.is_none()
  }
}

/// One accepted review, recorded with its own timestamp.
///
/// Statistics like "reviews completed today" count these events; they are
/// never inferred from schedule-state due dates.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewEvent {
  pub id: i64,
  pub item_id: String,
  pub grade: ReviewGrade,
  pub was_correct: bool,
  pub reviewed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_grade_from_str() {
    assert_eq!(ReviewGrade::from_str("again"), Some(ReviewGrade::Again));
    assert_eq!(ReviewGrade::from_str("hard"), Some(ReviewGrade::Hard));
    assert_eq!(ReviewGrade::from_str("good"), Some(ReviewGrade::Good));
    assert_eq!(ReviewGrade::from_str("easy"), Some(ReviewGrade::Easy));
  }

  #[test]
  fn test_grade_medium_alias() {
    assert_eq!(ReviewGrade::from_str("medium"), Some(ReviewGrade::Good));
  }

  #[test]
  fn test_grade_from_str_invalid() {
    assert_eq!(ReviewGrade::from_str("perfect"), None);
    assert_eq!(ReviewGrade::from_str(""), None);
    assert_eq!(ReviewGrade::from_str("Good"), None); // case sensitive
  }

  #[test]
  fn test_grade_roundtrip() {
    for grade in [
      ReviewGrade::Again,
      ReviewGrade::Hard,
      ReviewGrade::Good,
      ReviewGrade::Easy,
    ] {
      assert_eq!(ReviewGrade::from_str(grade.as_str()), Some(grade));
    }
  }

  #[test]
  fn test_grade_is_correct() {
    assert!(!ReviewGrade::Again.is_correct());
    assert!(ReviewGrade::Hard.is_correct());
    assert!(ReviewGrade::Good.is_correct());
    assert!(ReviewGrade::Easy.is_correct());
  }

  #[test]
  fn test_item_id_card_roundtrip() {
    let item = ItemId::Card(42);
    assert_eq!(item.to_string(), "card:42");
    assert_eq!(ItemId::from_str("card:42"), Some(item));
  }

  #[test]
  fn test_item_id_question_roundtrip() {
    let encoded = "question:ap-biology:unit-1:water:q1";
    let item = ItemId::from_str(encoded).unwrap();
    match &item {
      ItemId::Question(q) => {
        assert_eq!(q.course_id, "ap-biology");
        assert_eq!(q.question_id, "q1");
      }
      other => panic!("expected question item, got {:?}", other),
    }
    assert_eq!(item.to_string(), encoded);
  }

  #[test]
  fn test_item_id_rejects_malformed() {
    assert_eq!(ItemId::from_str(""), None);
    assert_eq!(ItemId::from_str("card:"), None);
    assert_eq!(ItemId::from_str("card:abc"), None);
    assert_eq!(ItemId::from_str("card:0"), None);
    assert_eq!(ItemId::from_str("card:-3"), None);
    assert_eq!(ItemId::from_str("question:only:three:segs"), None);
    assert_eq!(ItemId::from_str("question:a:b:c:d:e"), None);
    assert_eq!(ItemId::from_str("question:a::c:d"), None);
    assert_eq!(ItemId::from_str("deck:1"), None);
  }

  #[test]
  fn test_fresh_state_is_new_and_due() {
    let now = Utc::now();
    let state = ScheduleState::fresh("card:1".to_string(), now);
    assert!(state.is_new());
    assert_eq!(state.repetitions, 0);
    assert_eq!(state.interval_days, DEFAULT_INTERVAL_DAYS);
    assert_eq!(state.ease_factor, DEFAULT_EASE_FACTOR);
    assert_eq!(state.due_at, now);
    assert_eq!(state.revision, 0);
  }
}
