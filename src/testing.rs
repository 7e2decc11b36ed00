//! Test utilities for database setup.
//!
//! Reuses the authoritative schema initialization so tests never carry a
//! duplicate copy of the schema.

use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;

/// A migrated scratch database in a temporary directory. The directory is
/// removed when the environment drops.
pub struct TestEnv {
    /// Kept alive for the lifetime of the database file
    pub temp: TempDir,
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let db_path = temp.path().join("test.db");
        let conn = Connection::open(&db_path)?;
        crate::db::schema::run_migrations(&conn)?;

        // Seed the baseline users that ownership-scoped tests reference by id
        // (user 1 and user 2). The schema enforces foreign keys, so rows in
        // decks/goals/sessions must point at existing users.
        conn.execute_batch(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES (1, 'test-user-1', 'x', '2024-01-01T00:00:00+00:00'),
                   (2, 'test-user-2', 'x', '2024-01-01T00:00:00+00:00');
            "#,
        )?;

        Ok(Self { temp, conn })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}
