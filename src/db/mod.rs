pub mod catalog;
pub mod decks;
pub mod goals;
pub mod reviews;
pub mod schedule;
pub mod schema;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::AppError;

pub use schema::run_migrations;

pub type DbPool = Arc<Mutex<Connection>>;

/// Acquire the database lock, surfacing poisoning as a storage-layer error
/// instead of panicking in the request path.
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, AppError> {
  pool.lock().map_err(|_: PoisonError<_>| {
    tracing::error!("database mutex poisoned: a thread panicked while holding the lock");
    AppError::Lock
  })
}

pub fn init_db(path: &Path) -> Result<DbPool> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).ok();
  }

  // Keep a copy of the previous file before running migrations
  if path.exists() {
    let backup_path = path.with_extension("db.backup");
    if let Err(e) = std::fs::copy(path, &backup_path) {
      tracing::warn!("could not create database backup: {}", e);
    }
  }

  let conn = Connection::open(path)?;
  run_migrations(&conn)?;
  Ok(Arc::new(Mutex::new(conn)))
}

/// Parse an RFC 3339 column, reporting corrupt rows as conversion failures
/// rather than silently dropping them.
pub(crate) fn parse_timestamp(idx: usize, value: String) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(&value)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| {
      rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
