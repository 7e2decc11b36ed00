//! Application error taxonomy and HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors surfaced by the store, scheduler boundary, and auth layers.
///
/// Every failure is reported to the caller; handlers never substitute
/// defaults or placeholder data for a failed operation.
#[derive(Debug)]
pub enum AppError {
  /// Grade string outside the four-value enumeration
  InvalidGrade(String),
  /// Malformed request input (bad goal kind, non-positive target, ...)
  BadRequest(String),
  /// Missing or expired session
  Unauthorized,
  /// Item or owning collection absent, or not owned by the requesting user
  NotFound(&'static str),
  /// Uniqueness or concurrent-update violation
  Conflict(String),
  /// Persistence read/write failed; retryable by the caller
  Storage(rusqlite::Error),
  /// Database mutex poisoned
  Lock,
  /// Anything else that should never happen in a healthy process
  Internal(String),
}

impl std::fmt::Display for AppError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::InvalidGrade(g) => write!(f, "invalid review grade: {:?}", g),
      Self::BadRequest(msg) => write!(f, "{}", msg),
      Self::Unauthorized => write!(f, "not signed in"),
      Self::NotFound(what) => write!(f, "{} not found", what),
      Self::Conflict(msg) => write!(f, "{}", msg),
      Self::Storage(e) => write!(f, "storage failure: {}", e),
      Self::Lock => write!(f, "database unavailable"),
      Self::Internal(msg) => write!(f, "internal error: {}", msg),
    }
  }
}

impl std::error::Error for AppError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Storage(e) => Some(e),
      _ => None,
    }
  }
}

impl From<rusqlite::Error> for AppError {
  fn from(e: rusqlite::Error) -> Self {
    Self::Storage(e)
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = match &self {
      Self::InvalidGrade(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Unauthorized => StatusCode::UNAUTHORIZED,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::Storage(_) | Self::Lock | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    // Storage detail goes to the log, not the wire
    let message = match &self {
      Self::Storage(e) => {
        tracing::error!("storage failure: {}", e);
        "storage failure, please retry".to_string()
      }
      Self::Lock => {
        tracing::error!("database mutex poisoned");
        "database unavailable, please retry".to_string()
      }
      Self::Internal(msg) => {
        tracing::error!("internal error: {}", msg);
        "internal error".to_string()
      }
      other => other.to_string(),
    };

    (status, Json(json!({ "error": message }))).into_response()
  }
}
