//! Append-only review event log.
//!
//! Every accepted review inserts one row here, inside the same transaction
//! as the schedule-state update. Completion and accuracy statistics count
//! these rows; they are never inferred from schedule due dates.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result, params};

use crate::domain::{ReviewEvent, ReviewGrade};

use super::parse_timestamp;

pub fn insert_review_event(
    conn: &Connection,
    user_id: i64,
    item_id: &str,
    grade: ReviewGrade,
    reviewed_at: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO review_events (user_id, item_id, grade, was_correct, reviewed_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
        params![
            user_id,
            item_id,
            grade.as_str(),
            grade.is_correct() as i64,
            reviewed_at.to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn count_reviews_since(conn: &Connection, user_id: i64, since: DateTime<Utc>) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM review_events WHERE user_id = ?1 AND reviewed_at >= ?2",
        params![user_id, since.to_rfc3339()],
        |row| row.get(0),
    )
}

/// `(attempts, correct)` over the window starting at `since`.
pub fn accuracy_since(
    conn: &Connection,
    user_id: i64,
    since: DateTime<Utc>,
) -> Result<(i64, i64)> {
    conn.query_row(
        r#"
    SELECT COUNT(*), SUM(CASE WHEN was_correct = 1 THEN 1 ELSE 0 END)
    FROM review_events
    WHERE user_id = ?1 AND reviewed_at >= ?2
    "#,
        params![user_id, since.to_rfc3339()],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<i64>>(1)?.unwrap_or(0),
            ))
        },
    )
}

/// Most recent events first.
pub fn recent_events(conn: &Connection, user_id: i64, limit: i64) -> Result<Vec<ReviewEvent>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, item_id, grade, was_correct, reviewed_at
    FROM review_events
    WHERE user_id = ?1
    ORDER BY reviewed_at DESC, id DESC
    LIMIT ?2
    "#,
    )?;

    let events = stmt
        .query_map(params![user_id, limit.max(0)], |row| {
            let grade_raw: String = row.get(2)?;
            let grade = ReviewGrade::from_str(&grade_raw).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    format!("unknown grade: {grade_raw}").into(),
                )
            })?;
            let reviewed_raw: String = row.get(4)?;

            Ok(ReviewEvent {
                id: row.get(0)?,
                item_id: row.get(1)?,
                grade,
                was_correct: row.get(3)?,
                reviewed_at: parse_timestamp(4, reviewed_raw)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(events)
}
