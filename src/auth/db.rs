//! User and session queries.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, Result, params};

use crate::error::AppError;

pub fn create_user(
    conn: &Connection,
    username: &str,
    password_hash: &str,
    now: DateTime<Utc>,
) -> std::result::Result<i64, AppError> {
    let result = conn.execute(
        "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        params![username, password_hash, now.to_rfc3339()],
    );

    match result {
        Ok(_) => Ok(conn.last_insert_rowid()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(AppError::Conflict("username is already taken".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// `(user_id, password_hash)` for a login attempt.
pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<(i64, String)>> {
    conn.query_row(
        "SELECT id, password_hash FROM users WHERE username = ?1",
        params![username],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

pub fn update_last_login(conn: &Connection, user_id: i64, now: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE users SET last_login_at = ?1 WHERE id = ?2",
        params![now.to_rfc3339(), user_id],
    )?;
    Ok(())
}

pub fn create_session(
    conn: &Connection,
    user_id: i64,
    token_hash: &str,
    ttl_hours: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    let expires_at = now + Duration::hours(ttl_hours);
    conn.execute(
        "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
        params![token_hash, user_id, now.to_rfc3339(), expires_at.to_rfc3339()],
    )?;
    Ok(())
}

/// `(user_id, username)` for a live session, `None` if unknown or expired.
pub fn get_session_user(
    conn: &Connection,
    token_hash: &str,
    now: DateTime<Utc>,
) -> Result<Option<(i64, String)>> {
    conn.query_row(
        r#"
    SELECT u.id, u.username
    FROM sessions s
    JOIN users u ON s.user_id = u.id
    WHERE s.token_hash = ?1 AND s.expires_at > ?2
    "#,
        params![token_hash, now.to_rfc3339()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

pub fn delete_session(conn: &Connection, token_hash: &str) -> Result<()> {
    conn.execute("DELETE FROM sessions WHERE token_hash = ?1", params![token_hash])?;
    Ok(())
}

pub fn cleanup_expired_sessions(conn: &Connection, now: DateTime<Utc>) -> Result<usize> {
    conn.execute(
        "DELETE FROM sessions WHERE expires_at <= ?1",
        params![now.to_rfc3339()],
    )
}
