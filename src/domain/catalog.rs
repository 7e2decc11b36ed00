use serde::{Deserialize, Serialize};

/// An AP course (e.g. AP Biology). Catalog content is read-only and shared
/// across users; ids are stable slugs used in composite question ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
  pub id: String,
  pub title: String,
  pub subject: String,
  pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
  pub id: String,
  pub course_id: String,
  pub title: String,
  pub position: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
  pub id: String,
  pub course_id: String,
  pub unit_id: String,
  pub title: String,
  pub position: i64,
}

/// A multiple-choice practice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
  pub id: String,
  pub course_id: String,
  pub unit_id: String,
  pub topic_id: String,
  pub prompt: String,
  pub choices: Vec<String>,
  pub answer_index: i64,
  pub explanation: Option<String>,
}

impl Question {
  /// The composite reference used to schedule reviews of this question.
  pub fn item_ref(&self) -> QuestionRef {
    QuestionRef {
      course_id: self.course_id.clone(),
      unit_id: self.unit_id.clone(),
      topic_id: self.topic_id.clone(),
      question_id: self.id.clone(),
    }
  }
}

/// Fully-qualified question reference: course/unit/topic/question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRef {
  pub course_id: String,
  pub unit_id: String,
  pub topic_id: String,
  pub question_id: String,
}
