pub mod catalog;
pub mod deck;
pub mod goal;
pub mod review;

pub use catalog::{Course, Question, QuestionRef, Topic, Unit};
pub use deck::{Deck, Flashcard};
pub use goal::{Goal, GoalKind};
pub use review::{ItemId, ReviewEvent, ReviewGrade, ScheduleState};
