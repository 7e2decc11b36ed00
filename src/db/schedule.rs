//! Schedule-state persistence and due-item queries.
//!
//! One row per `(user_id, item_id)`. Updates are single-row, guarded by the
//! `revision` token, and run inside a transaction together with the review
//! event append — there is no whole-collection rewrite anywhere.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result, params};
use serde::Serialize;

use crate::domain::{ItemId, ReviewGrade, ScheduleState};
use crate::error::AppError;
use crate::srs::{self, SchedulerPolicy};

use super::{catalog, decks, parse_timestamp, reviews};

/// Register an item with a fresh (never-reviewed, immediately due) state.
/// No-op if the item is already tracked.
pub fn register_item(
    conn: &Connection,
    user_id: i64,
    item_id: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        r#"
    INSERT OR IGNORE INTO schedule_states (user_id, item_id, due_at)
    VALUES (?1, ?2, ?3)
    "#,
        params![user_id, item_id, now.to_rfc3339()],
    )?;
    Ok(())
}

pub fn get_state(conn: &Connection, user_id: i64, item_id: &str) -> Result<Option<ScheduleState>> {
    conn.query_row(
        r#"
    SELECT item_id, interval_days, ease_factor, repetitions, last_reviewed_at, due_at, revision
    FROM schedule_states
    WHERE user_id = ?1 AND item_id = ?2
    "#,
        params![user_id, item_id],
        row_to_state,
    )
    .optional()
}

/// Items eligible for review at `as_of`: never-reviewed items first (stable
/// order by item id), then overdue items by ascending due date.
pub fn due_items(
    conn: &Connection,
    user_id: i64,
    as_of: DateTime<Utc>,
    limit: i64,
) -> std::result::Result<Vec<ScheduleState>, AppError> {
    let mut stmt = conn.prepare(
        r#"
    SELECT item_id, interval_days, ease_factor, repetitions, last_reviewed_at, due_at, revision
    FROM schedule_states
    WHERE user_id = ?1 AND (last_reviewed_at IS NULL OR due_at <= ?2)
    ORDER BY (last_reviewed_at IS NULL) DESC, due_at ASC, item_id ASC
    LIMIT ?3
    "#,
    )?;

    let items = stmt
        .query_map(params![user_id, as_of.to_rfc3339(), limit.max(0)], row_to_state)?
        .collect::<Result<Vec<_>>>()?;
    Ok(items)
}

/// Record a graded review for one item.
///
/// Verifies ownership before touching any state: flashcards must belong to
/// one of the user's decks, questions must exist in the catalog. The state
/// update and the review-event append commit atomically; any failure rolls
/// the whole operation back.
pub fn record_review(
    conn: &mut Connection,
    policy: &SchedulerPolicy,
    user_id: i64,
    item: &ItemId,
    grade: ReviewGrade,
    now: DateTime<Utc>,
) -> std::result::Result<ScheduleState, AppError> {
    let owned = match item {
        ItemId::Card(card_id) => decks::card_owned_by(conn, user_id, *card_id)?,
        ItemId::Question(question) => catalog::question_exists(conn, question)?,
    };
    if !owned {
        return Err(AppError::NotFound("item"));
    }

    let key = item.to_string();
    let tx = conn.transaction()?;

    let current = tx
        .query_row(
            r#"
      SELECT item_id, interval_days, ease_factor, repetitions, last_reviewed_at, due_at, revision
      FROM schedule_states
      WHERE user_id = ?1 AND item_id = ?2
      "#,
            params![user_id, key],
            row_to_state,
        )
        .optional()?;

    let existed = current.is_some();
    let base = current.unwrap_or_else(|| ScheduleState::fresh(key.clone(), now));

    let mut next = srs::compute_next(policy, &base, grade, now);
    next.revision = base.revision + 1;

    if existed {
        let updated = tx.execute(
            r#"
      UPDATE schedule_states
      SET interval_days = ?1, ease_factor = ?2, repetitions = ?3,
          last_reviewed_at = ?4, due_at = ?5, revision = ?6
      WHERE user_id = ?7 AND item_id = ?8 AND revision = ?9
      "#,
            params![
                next.interval_days,
                next.ease_factor,
                next.repetitions,
                next.last_reviewed_at.map(|dt| dt.to_rfc3339()),
                next.due_at.to_rfc3339(),
                next.revision,
                user_id,
                key,
                base.revision,
            ],
        )?;
        if updated == 0 {
            return Err(AppError::Conflict("item was reviewed concurrently, retry".to_string()));
        }
    } else {
        tx.execute(
            r#"
      INSERT INTO schedule_states
        (user_id, item_id, interval_days, ease_factor, repetitions, last_reviewed_at, due_at, revision)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
      "#,
            params![
                user_id,
                key,
                next.interval_days,
                next.ease_factor,
                next.repetitions,
                next.last_reviewed_at.map(|dt| dt.to_rfc3339()),
                next.due_at.to_rfc3339(),
                next.revision,
            ],
        )?;
    }

    reviews::insert_review_event(&tx, user_id, &key, grade, now)?;
    tx.commit()?;

    Ok(next)
}

/// Due-bucket counts against UTC day boundaries of `as_of`. Buckets are
/// disjoint: `due_today` includes everything already eligible, `due_tomorrow`
/// covers the next day, `due_next_week` the six days after that.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewStats {
    pub total_items: i64,
    pub due_now: i64,
    pub due_today: i64,
    pub due_tomorrow: i64,
    pub due_next_week: i64,
    pub reviews_today: i64,
}

pub fn review_stats(
    conn: &Connection,
    user_id: i64,
    as_of: DateTime<Utc>,
) -> std::result::Result<ReviewStats, AppError> {
    let day_start = as_of.date_naive().and_time(NaiveTime::MIN).and_utc();
    let end_today = day_start + Duration::days(1);
    let end_tomorrow = day_start + Duration::days(2);
    let end_week = day_start + Duration::days(8);

    let (total_items, due_now, due_today, due_tomorrow, due_next_week) = conn.query_row(
        r#"
    SELECT
      COUNT(*),
      SUM(CASE WHEN last_reviewed_at IS NULL OR due_at <= ?1 THEN 1 ELSE 0 END),
      SUM(CASE WHEN last_reviewed_at IS NULL OR due_at < ?2 THEN 1 ELSE 0 END),
      SUM(CASE WHEN last_reviewed_at IS NOT NULL AND due_at >= ?2 AND due_at < ?3 THEN 1 ELSE 0 END),
      SUM(CASE WHEN last_reviewed_at IS NOT NULL AND due_at >= ?3 AND due_at < ?4 THEN 1 ELSE 0 END)
    FROM schedule_states
    WHERE user_id = ?5
    "#,
        params![
            as_of.to_rfc3339(),
            end_today.to_rfc3339(),
            end_tomorrow.to_rfc3339(),
            end_week.to_rfc3339(),
            user_id,
        ],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<i64>>(1)?.unwrap_or(0),
                row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                row.get::<_, Option<i64>>(3)?.unwrap_or(0),
                row.get::<_, Option<i64>>(4)?.unwrap_or(0),
            ))
        },
    )?;

    let reviews_today = reviews::count_reviews_since(conn, user_id, day_start)?;

    Ok(ReviewStats {
        total_items,
        due_now,
        due_today,
        due_tomorrow,
        due_next_week,
        reviews_today,
    })
}

/// Interval at which an item counts as learned
pub const MATURE_INTERVAL_DAYS: f64 = 21.0;

/// Per-course tracking counts for the progress summary. Question items are
/// matched by their `question:<course>:` key prefix.
#[derive(Debug, Clone, Serialize)]
pub struct CourseProgress {
    pub course_id: String,
    pub title: String,
    pub items_tracked: i64,
    pub items_learned: i64,
}

pub fn course_breakdown(
    conn: &Connection,
    user_id: i64,
) -> std::result::Result<Vec<CourseProgress>, AppError> {
    let mut stmt = conn.prepare(
        r#"
    SELECT c.id, c.title,
           COUNT(s.item_id),
           SUM(CASE WHEN s.interval_days >= ?1 AND s.last_reviewed_at IS NOT NULL THEN 1 ELSE 0 END)
    FROM courses c
    LEFT JOIN schedule_states s
      ON s.user_id = ?2 AND s.item_id LIKE 'question:' || c.id || ':%'
    GROUP BY c.id
    ORDER BY c.title
    "#,
    )?;

    let breakdown = stmt
        .query_map(params![MATURE_INTERVAL_DAYS, user_id], |row| {
            Ok(CourseProgress {
                course_id: row.get(0)?,
                title: row.get(1)?,
                items_tracked: row.get(2)?,
                items_learned: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(breakdown)
}

fn row_to_state(row: &rusqlite::Row) -> Result<ScheduleState> {
    let last_reviewed_raw: Option<String> = row.get(4)?;
    let last_reviewed_at = match last_reviewed_raw {
        Some(s) => Some(parse_timestamp(4, s)?),
        None => None,
    };
    let due_raw: String = row.get(5)?;

    Ok(ScheduleState {
        item_id: row.get(0)?,
        interval_days: row.get(1)?,
        ease_factor: row.get(2)?,
        repetitions: row.get(3)?,
        last_reviewed_at,
        due_at: parse_timestamp(5, due_raw)?,
        revision: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::catalog::seed_catalog;
    use crate::domain::QuestionRef;
    use crate::testing::TestEnv;
    use chrono::TimeZone;

    const USER: i64 = 1;

    fn question_item() -> ItemId {
        ItemId::Question(QuestionRef {
            course_id: "ap-biology".to_string(),
            unit_id: "unit-1".to_string(),
            topic_id: "water".to_string(),
            question_id: "q1".to_string(),
        })
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn set_reviewed(conn: &Connection, item_id: &str, due_at: DateTime<Utc>) {
        conn.execute(
            "UPDATE schedule_states SET last_reviewed_at = ?1, due_at = ?2, repetitions = 1 WHERE item_id = ?3",
            params![due_at.to_rfc3339(), due_at.to_rfc3339(), item_id],
        )
        .unwrap();
    }

    #[test]
    fn test_first_review_creates_state_and_event() {
        let mut env = TestEnv::new().unwrap();
        seed_catalog(&env.conn).unwrap();
        let now = at(2024, 1, 1);

        let state = record_review(
            &mut env.conn,
            &SchedulerPolicy::default(),
            USER,
            &question_item(),
            ReviewGrade::Easy,
            now,
        )
        .unwrap();

        assert_eq!(state.repetitions, 1);
        assert_eq!(state.interval_days, 5.0);
        assert_eq!(state.revision, 1);

        let stored = get_state(&env.conn, USER, &question_item().to_string())
            .unwrap()
            .unwrap();
        assert_eq!(stored, state);

        let events = reviews::count_reviews_since(&env.conn, USER, at(2024, 1, 1)).unwrap();
        assert_eq!(events, 1);
    }

    #[test]
    fn test_revision_increments_per_review() {
        let mut env = TestEnv::new().unwrap();
        seed_catalog(&env.conn).unwrap();

        let first = record_review(
            &mut env.conn,
            &SchedulerPolicy::default(),
            USER,
            &question_item(),
            ReviewGrade::Good,
            at(2024, 1, 1),
        )
        .unwrap();
        let second = record_review(
            &mut env.conn,
            &SchedulerPolicy::default(),
            USER,
            &question_item(),
            ReviewGrade::Good,
            at(2024, 1, 4),
        )
        .unwrap();

        assert_eq!(first.revision, 1);
        assert_eq!(second.revision, 2);
        assert_eq!(second.repetitions, 2);
    }

    #[test]
    fn test_unknown_question_not_found_and_no_state_written() {
        let mut env = TestEnv::new().unwrap();
        seed_catalog(&env.conn).unwrap();

        let bogus = ItemId::Question(QuestionRef {
            course_id: "ap-biology".to_string(),
            unit_id: "unit-1".to_string(),
            topic_id: "water".to_string(),
            question_id: "q99".to_string(),
        });

        let err = record_review(
            &mut env.conn,
            &SchedulerPolicy::default(),
            USER,
            &bogus,
            ReviewGrade::Good,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert!(get_state(&env.conn, USER, &bogus.to_string()).unwrap().is_none());
    }

    #[test]
    fn test_card_not_owned_is_not_found() {
        let mut env = TestEnv::new().unwrap();

        let err = record_review(
            &mut env.conn,
            &SchedulerPolicy::default(),
            USER,
            &ItemId::Card(999),
            ReviewGrade::Good,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_never_reviewed_sort_before_overdue() {
        let env = TestEnv::new().unwrap();
        let now = at(2024, 1, 10);

        // Item B was reviewed and became due yesterday; item A has never
        // been reviewed and must still sort first.
        register_item(&env.conn, USER, "card:2", now).unwrap();
        set_reviewed(&env.conn, "card:2", now - Duration::days(1));
        register_item(&env.conn, USER, "card:1", now).unwrap();

        let due = due_items(&env.conn, USER, now, 10).unwrap();
        let keys: Vec<&str> = due.iter().map(|s| s.item_id.as_str()).collect();
        assert_eq!(keys, vec!["card:1", "card:2"]);
        assert!(due[0].is_new());
    }

    #[test]
    fn test_due_items_orders_overdue_by_due_date() {
        let env = TestEnv::new().unwrap();
        let now = at(2024, 1, 10);

        register_item(&env.conn, USER, "card:1", now).unwrap();
        register_item(&env.conn, USER, "card:2", now).unwrap();
        register_item(&env.conn, USER, "card:3", now).unwrap();
        set_reviewed(&env.conn, "card:1", now - Duration::days(1));
        set_reviewed(&env.conn, "card:2", now - Duration::days(5));
        // card:3 is due in the future and must not appear
        set_reviewed(&env.conn, "card:3", now + Duration::days(3));

        let due = due_items(&env.conn, USER, now, 10).unwrap();
        let keys: Vec<&str> = due.iter().map(|s| s.item_id.as_str()).collect();
        assert_eq!(keys, vec!["card:2", "card:1"]);
    }

    #[test]
    fn test_due_items_respects_limit_and_is_idempotent() {
        let env = TestEnv::new().unwrap();
        let now = at(2024, 1, 10);

        for i in 1..=5 {
            register_item(&env.conn, USER, &format!("card:{}", i), now).unwrap();
        }

        let first = due_items(&env.conn, USER, now, 3).unwrap();
        assert_eq!(first.len(), 3);

        let second = due_items(&env.conn, USER, now, 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_due_items_scoped_to_user() {
        let env = TestEnv::new().unwrap();
        let now = at(2024, 1, 10);

        register_item(&env.conn, USER, "card:1", now).unwrap();
        register_item(&env.conn, 2, "card:2", now).unwrap();

        let due = due_items(&env.conn, USER, now, 10).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].item_id, "card:1");
    }

    #[test]
    fn test_stats_buckets() {
        let env = TestEnv::new().unwrap();
        let now = at(2024, 1, 10); // noon

        // Never reviewed: counts toward due_now and due_today
        register_item(&env.conn, USER, "card:1", now).unwrap();
        // Due later today
        register_item(&env.conn, USER, "card:2", now).unwrap();
        set_reviewed(&env.conn, "card:2", now + Duration::hours(4));
        // Due tomorrow
        register_item(&env.conn, USER, "card:3", now).unwrap();
        set_reviewed(&env.conn, "card:3", now + Duration::days(1));
        // Due in four days
        register_item(&env.conn, USER, "card:4", now).unwrap();
        set_reviewed(&env.conn, "card:4", now + Duration::days(4));
        // Due far out, lands in no near-term bucket
        register_item(&env.conn, USER, "card:5", now).unwrap();
        set_reviewed(&env.conn, "card:5", now + Duration::days(30));

        let stats = review_stats(&env.conn, USER, now).unwrap();
        assert_eq!(stats.total_items, 5);
        assert_eq!(stats.due_now, 1);
        assert_eq!(stats.due_today, 2);
        assert_eq!(stats.due_tomorrow, 1);
        assert_eq!(stats.due_next_week, 1);
        assert_eq!(stats.reviews_today, 0);
    }

    #[test]
    fn test_stats_empty_store() {
        let env = TestEnv::new().unwrap();
        let stats = review_stats(&env.conn, USER, Utc::now()).unwrap();
        assert_eq!(stats.total_items, 0);
        assert_eq!(stats.due_now, 0);
    }
}
