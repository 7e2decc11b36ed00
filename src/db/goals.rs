//! Study goal CRUD and computed progress

use chrono::{DateTime, Duration, NaiveTime, Utc};
use rusqlite::{Connection, Result, params};
use serde::Serialize;

use crate::domain::{Goal, GoalKind};
use crate::error::AppError;

use super::{parse_timestamp, reviews};

/// A goal joined with its progress over the relevant window. `completed`
/// counts recorded review events, never schedule mutations.
#[derive(Debug, Clone, Serialize)]
pub struct GoalProgress {
    #[serde(flatten)]
    pub goal: Goal,
    pub completed: i64,
    pub achieved: bool,
}

pub fn insert_goal(
    conn: &Connection,
    user_id: i64,
    title: &str,
    kind: GoalKind,
    target: i64,
    now: DateTime<Utc>,
) -> Result<Goal> {
    conn.execute(
        "INSERT INTO goals (user_id, title, kind, target, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user_id, title, kind.as_str(), target, now.to_rfc3339()],
    )?;

    Ok(Goal {
        id: conn.last_insert_rowid(),
        user_id,
        title: title.to_string(),
        kind,
        target,
        created_at: now,
    })
}

pub fn get_goals_with_progress(
    conn: &Connection,
    user_id: i64,
    as_of: DateTime<Utc>,
) -> std::result::Result<Vec<GoalProgress>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, title, kind, target, created_at FROM goals WHERE user_id = ?1 ORDER BY id",
    )?;

    let goals = stmt
        .query_map(params![user_id], row_to_goal)?
        .collect::<Result<Vec<_>>>()?;

    let mut progress = Vec::with_capacity(goals.len());
    for goal in goals {
        let window_start = match goal.kind {
            GoalKind::DailyReviews => as_of.date_naive().and_time(NaiveTime::MIN).and_utc(),
            GoalKind::WeeklyReviews => as_of - Duration::days(7),
        };
        let completed = reviews::count_reviews_since(conn, user_id, window_start)?;
        progress.push(GoalProgress {
            achieved: completed >= goal.target,
            goal,
            completed,
        });
    }
    Ok(progress)
}

pub fn delete_goal(
    conn: &Connection,
    user_id: i64,
    goal_id: i64,
) -> std::result::Result<(), AppError> {
    let deleted = conn.execute(
        "DELETE FROM goals WHERE id = ?1 AND user_id = ?2",
        params![goal_id, user_id],
    )?;
    if deleted == 0 {
        return Err(AppError::NotFound("goal"));
    }
    Ok(())
}

fn row_to_goal(row: &rusqlite::Row) -> Result<Goal> {
    let kind_raw: String = row.get(3)?;
    let kind = GoalKind::from_str(&kind_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown goal kind: {kind_raw}").into(),
        )
    })?;
    let created_raw: String = row.get(5)?;

    Ok(Goal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        kind,
        target: row.get(4)?,
        created_at: parse_timestamp(5, created_raw)?,
    })
}
