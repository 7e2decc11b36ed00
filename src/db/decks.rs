//! Deck and flashcard CRUD with ownership checks.
//!
//! Ownership is always resolved through the deck's `user_id` before any
//! schedule state is touched. Deleting a deck or card also deletes the
//! schedule states of the removed cards; review events stay as history.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result, params};
use serde::Serialize;

use crate::domain::{Deck, Flashcard, ItemId};
use crate::error::AppError;

use super::{parse_timestamp, schedule};

/// Deck listing row with its card count.
#[derive(Debug, Clone, Serialize)]
pub struct DeckSummary {
    pub id: i64,
    pub title: String,
    pub course_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub card_count: i64,
}

pub fn insert_deck(
    conn: &Connection,
    user_id: i64,
    title: &str,
    course_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Deck> {
    conn.execute(
        "INSERT INTO decks (user_id, title, course_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, title, course_id, now.to_rfc3339()],
    )?;

    Ok(Deck {
        id: conn.last_insert_rowid(),
        user_id,
        title: title.to_string(),
        course_id: course_id.map(|s| s.to_string()),
        created_at: now,
    })
}

pub fn get_decks(conn: &Connection, user_id: i64) -> Result<Vec<DeckSummary>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT d.id, d.title, d.course_id, d.created_at, COUNT(f.id)
    FROM decks d
    LEFT JOIN flashcards f ON f.deck_id = d.id
    WHERE d.user_id = ?1
    GROUP BY d.id
    ORDER BY d.created_at, d.id
    "#,
    )?;

    let decks = stmt
        .query_map(params![user_id], |row| {
            let created_raw: String = row.get(3)?;
            Ok(DeckSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                course_id: row.get(2)?,
                created_at: parse_timestamp(3, created_raw)?,
                card_count: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(decks)
}

pub fn get_deck(conn: &Connection, user_id: i64, deck_id: i64) -> Result<Option<Deck>> {
    conn.query_row(
        "SELECT id, user_id, title, course_id, created_at FROM decks WHERE id = ?1 AND user_id = ?2",
        params![deck_id, user_id],
        |row| {
            let created_raw: String = row.get(4)?;
            Ok(Deck {
                id: row.get(0)?,
                user_id: row.get(1)?,
                title: row.get(2)?,
                course_id: row.get(3)?,
                created_at: parse_timestamp(4, created_raw)?,
            })
        },
    )
    .optional()
}

pub fn get_cards(
    conn: &Connection,
    user_id: i64,
    deck_id: i64,
) -> std::result::Result<Vec<Flashcard>, AppError> {
    if get_deck(conn, user_id, deck_id)?.is_none() {
        return Err(AppError::NotFound("deck"));
    }

    let mut stmt = conn.prepare(
        "SELECT id, deck_id, front, back, created_at FROM flashcards WHERE deck_id = ?1 ORDER BY id",
    )?;

    let cards = stmt
        .query_map(params![deck_id], row_to_card)?
        .collect::<Result<Vec<_>>>()?;
    Ok(cards)
}

/// Add a card and register its schedule state in one transaction, so the
/// new card is immediately visible in the due queue as never-reviewed.
pub fn insert_card(
    conn: &mut Connection,
    user_id: i64,
    deck_id: i64,
    front: &str,
    back: &str,
    now: DateTime<Utc>,
) -> std::result::Result<Flashcard, AppError> {
    if get_deck(conn, user_id, deck_id)?.is_none() {
        return Err(AppError::NotFound("deck"));
    }

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO flashcards (deck_id, front, back, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![deck_id, front, back, now.to_rfc3339()],
    )?;
    let card_id = tx.last_insert_rowid();
    schedule::register_item(&tx, user_id, &ItemId::Card(card_id).to_string(), now)?;
    tx.commit()?;

    Ok(Flashcard {
        id: card_id,
        deck_id,
        front: front.to_string(),
        back: back.to_string(),
        created_at: now,
    })
}

pub fn delete_card(
    conn: &mut Connection,
    user_id: i64,
    deck_id: i64,
    card_id: i64,
) -> std::result::Result<(), AppError> {
    if get_deck(conn, user_id, deck_id)?.is_none() {
        return Err(AppError::NotFound("deck"));
    }

    let tx = conn.transaction()?;
    let deleted = tx.execute(
        "DELETE FROM flashcards WHERE id = ?1 AND deck_id = ?2",
        params![card_id, deck_id],
    )?;
    if deleted == 0 {
        return Err(AppError::NotFound("card"));
    }
    tx.execute(
        "DELETE FROM schedule_states WHERE user_id = ?1 AND item_id = ?2",
        params![user_id, ItemId::Card(card_id).to_string()],
    )?;
    tx.commit()?;
    Ok(())
}

/// Delete a deck, its cards, and the schedule states of those cards.
pub fn delete_deck(
    conn: &mut Connection,
    user_id: i64,
    deck_id: i64,
) -> std::result::Result<(), AppError> {
    if get_deck(conn, user_id, deck_id)?.is_none() {
        return Err(AppError::NotFound("deck"));
    }

    let tx = conn.transaction()?;
    tx.execute(
        r#"
    DELETE FROM schedule_states
    WHERE user_id = ?1
      AND item_id IN (SELECT 'card:' || id FROM flashcards WHERE deck_id = ?2)
    "#,
        params![user_id, deck_id],
    )?;
    tx.execute("DELETE FROM flashcards WHERE deck_id = ?1", params![deck_id])?;
    tx.execute("DELETE FROM decks WHERE id = ?1", params![deck_id])?;
    tx.commit()?;
    Ok(())
}

/// True if the card exists and belongs to one of the user's decks.
pub fn card_owned_by(conn: &Connection, user_id: i64, card_id: i64) -> Result<bool> {
    let count: i64 = conn.query_row(
        r#"
    SELECT COUNT(*)
    FROM flashcards f
    JOIN decks d ON f.deck_id = d.id
    WHERE f.id = ?1 AND d.user_id = ?2
    "#,
        params![card_id, user_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn row_to_card(row: &rusqlite::Row) -> Result<Flashcard> {
    let created_raw: String = row.get(4)?;
    Ok(Flashcard {
        id: row.get(0)?,
        deck_id: row.get(1)?,
        front: row.get(2)?,
        back: row.get(3)?,
        created_at: parse_timestamp(4, created_raw)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    const USER: i64 = 1;
    const OTHER_USER: i64 = 2;

    fn deck_with_card(env: &mut TestEnv) -> (Deck, Flashcard) {
        let now = Utc::now();
        let deck = insert_deck(&env.conn, USER, "Unit 1 vocab", Some("ap-biology"), now).unwrap();
        let card = insert_card(&mut env.conn, USER, deck.id, "Cohesion", "Water sticking to water", now).unwrap();
        (deck, card)
    }

    #[test]
    fn test_insert_card_registers_schedule_state() {
        let mut env = TestEnv::new().unwrap();
        let (_, card) = deck_with_card(&mut env);

        let state = schedule::get_state(&env.conn, USER, &format!("card:{}", card.id))
            .unwrap()
            .unwrap();
        assert!(state.is_new());
        assert_eq!(state.repetitions, 0);
    }

    #[test]
    fn test_ownership_checks() {
        let mut env = TestEnv::new().unwrap();
        let (deck, card) = deck_with_card(&mut env);

        assert!(card_owned_by(&env.conn, USER, card.id).unwrap());
        assert!(!card_owned_by(&env.conn, OTHER_USER, card.id).unwrap());
        assert!(get_deck(&env.conn, OTHER_USER, deck.id).unwrap().is_none());
    }

    #[test]
    fn test_insert_card_into_foreign_deck_fails() {
        let mut env = TestEnv::new().unwrap();
        let (deck, _) = deck_with_card(&mut env);

        let err = insert_card(&mut env.conn, OTHER_USER, deck.id, "front", "back", Utc::now())
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_delete_card_removes_schedule_state() {
        let mut env = TestEnv::new().unwrap();
        let (deck, card) = deck_with_card(&mut env);

        delete_card(&mut env.conn, USER, deck.id, card.id).unwrap();

        assert!(!card_owned_by(&env.conn, USER, card.id).unwrap());
        let state = schedule::get_state(&env.conn, USER, &format!("card:{}", card.id)).unwrap();
        assert!(state.is_none());
    }

    #[test]
    fn test_delete_missing_card_is_not_found() {
        let mut env = TestEnv::new().unwrap();
        let (deck, _) = deck_with_card(&mut env);

        let err = delete_card(&mut env.conn, USER, deck.id, 999).unwrap_err();
        assert!(matches!(err, AppError::NotFound("card")));
    }

    #[test]
    fn test_delete_deck_cascades() {
        let mut env = TestEnv::new().unwrap();
        let (deck, card) = deck_with_card(&mut env);

        delete_deck(&mut env.conn, USER, deck.id).unwrap();

        assert!(get_deck(&env.conn, USER, deck.id).unwrap().is_none());
        assert!(!card_owned_by(&env.conn, USER, card.id).unwrap());
        let state = schedule::get_state(&env.conn, USER, &format!("card:{}", card.id)).unwrap();
        assert!(state.is_none());
    }

    #[test]
    fn test_deck_summaries_count_cards() {
        let mut env = TestEnv::new().unwrap();
        let (deck, _) = deck_with_card(&mut env);
        insert_card(&mut env.conn, USER, deck.id, "Adhesion", "Water sticking to surfaces", Utc::now()).unwrap();
        insert_deck(&env.conn, USER, "Empty deck", None, Utc::now()).unwrap();

        let summaries = get_decks(&env.conn, USER).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].card_count, 2);
        assert_eq!(summaries[1].card_count, 0);

        assert!(get_decks(&env.conn, OTHER_USER).unwrap().is_empty());
    }
}
