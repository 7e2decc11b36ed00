//! Application configuration.
//!
//! Values resolve with priority: config.toml > environment (.env supported)
//! > built-in default. The `[scheduler]` section overrides individual
//! scheduling constants; omitted fields keep their defaults.

use serde::Deserialize;
use std::path::PathBuf;

use crate::srs::SchedulerPolicy;

// ==================== Server Configuration ====================

pub const SERVER_ADDR: &str = "0.0.0.0";
pub const SERVER_PORT: u16 = 3000;

/// Session lifetime (1 week)
pub const SESSION_TTL_HOURS: i64 = 24 * 7;

/// Probability threshold for piggybacked session cleanup (0-255; 25 ≈ 10%
/// of authenticated requests)
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

// ==================== Query Limits ====================

/// Default limit for the due-item queue
pub const DEFAULT_DUE_LIMIT: i64 = 20;

/// Hard ceiling for the due-item queue
pub const MAX_DUE_LIMIT: i64 = 200;

/// Default number of questions in a practice sample
pub const DEFAULT_PRACTICE_LIMIT: usize = 10;

// ==================== Loading ====================

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
  database: Option<DatabaseSection>,
  server: Option<ServerSection>,
  scheduler: Option<SchedulerPolicy>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
  path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
  bind: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
  pub database_path: PathBuf,
  pub bind_addr: String,
  pub scheduler: SchedulerPolicy,
}

pub fn load() -> Config {
  // Load .env file if present
  let _ = dotenvy::dotenv();

  let file = read_file_config("config.toml");

  let database_path = file
    .database
    .as_ref()
    .and_then(|d| d.path.clone())
    .map(PathBuf::from)
    .or_else(|| std::env::var("DATABASE_PATH").ok().map(PathBuf::from))
    .unwrap_or_else(|| PathBuf::from("data/ap_prep.db"));

  let bind_addr = file
    .server
    .as_ref()
    .and_then(|s| s.bind.clone())
    .or_else(|| std::env::var("BIND_ADDR").ok())
    .unwrap_or_else(|| format!("{}:{}", SERVER_ADDR, SERVER_PORT));

  tracing::info!("using database at {}", database_path.display());

  Config {
    database_path,
    bind_addr,
    scheduler: file.scheduler.unwrap_or_default(),
  }
}

fn read_file_config(path: &str) -> FileConfig {
  match std::fs::read_to_string(path) {
    Ok(contents) => match toml::from_str(&contents) {
      Ok(config) => config,
      Err(e) => {
        // A broken config file should be loud, not silently ignored
        tracing::warn!("ignoring invalid {}: {}", path, e);
        FileConfig::default()
      }
    },
    Err(_) => FileConfig::default(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_scheduler_section_partial_override() {
    let parsed: FileConfig = toml::from_str(
      r#"
      [scheduler]
      max_interval_days = 180.0
      "#,
    )
    .unwrap();

    let policy = parsed.scheduler.unwrap();
    assert_eq!(policy.max_interval_days, 180.0);
    // Untouched fields keep their defaults
    assert_eq!(policy.first_interval_easy, 5.0);
    assert_eq!(policy.easy_bonus, 1.5);
  }

  #[test]
  fn test_full_file_parses() {
    let parsed: FileConfig = toml::from_str(
      r#"
      [database]
      path = "/tmp/study.db"

      [server]
      bind = "127.0.0.1:8080"
      "#,
    )
    .unwrap();

    assert_eq!(parsed.database.unwrap().path.unwrap(), "/tmp/study.db");
    assert_eq!(parsed.server.unwrap().bind.unwrap(), "127.0.0.1:8080");
  }
}
