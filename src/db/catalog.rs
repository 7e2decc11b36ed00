//! Course catalog queries and seed content

use rusqlite::{Connection, OptionalExtension, Result, params};

use crate::domain::{Course, Question, QuestionRef, Topic, Unit};

pub fn get_courses(conn: &Connection) -> Result<Vec<Course>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, subject, description FROM courses ORDER BY title",
    )?;

    let courses = stmt
        .query_map([], row_to_course)?
        .collect::<Result<Vec<_>>>()?;
    Ok(courses)
}

pub fn get_course(conn: &Connection, course_id: &str) -> Result<Option<Course>> {
    conn.query_row(
        "SELECT id, title, subject, description FROM courses WHERE id = ?1",
        params![course_id],
        row_to_course,
    )
    .optional()
}

pub fn get_units(conn: &Connection, course_id: &str) -> Result<Vec<Unit>> {
    let mut stmt = conn.prepare(
        "SELECT id, course_id, title, position FROM units WHERE course_id = ?1 ORDER BY position",
    )?;

    let units = stmt
        .query_map(params![course_id], |row| {
            Ok(Unit {
                id: row.get(0)?,
                course_id: row.get(1)?,
                title: row.get(2)?,
                position: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(units)
}

pub fn get_topics(conn: &Connection, course_id: &str, unit_id: &str) -> Result<Vec<Topic>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, course_id, unit_id, title, position
    FROM topics
    WHERE course_id = ?1 AND unit_id = ?2
    ORDER BY position
    "#,
    )?;

    let topics = stmt
        .query_map(params![course_id, unit_id], |row| {
            Ok(Topic {
                id: row.get(0)?,
                course_id: row.get(1)?,
                unit_id: row.get(2)?,
                title: row.get(3)?,
                position: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(topics)
}

pub fn get_questions_for_course(conn: &Connection, course_id: &str) -> Result<Vec<Question>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, course_id, unit_id, topic_id, prompt, choices, answer_index, explanation
    FROM questions
    WHERE course_id = ?1
    ORDER BY unit_id, topic_id, id
    "#,
    )?;

    let questions = stmt
        .query_map(params![course_id], row_to_question)?
        .collect::<Result<Vec<_>>>()?;
    Ok(questions)
}

pub fn count_questions(conn: &Connection, course_id: &str) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM questions WHERE course_id = ?1",
        params![course_id],
        |row| row.get(0),
    )
}

/// Existence check for the composite question reference used in item ids.
pub fn question_exists(conn: &Connection, question: &QuestionRef) -> Result<bool> {
    let count: i64 = conn.query_row(
        r#"
    SELECT COUNT(*)
    FROM questions
    WHERE course_id = ?1 AND unit_id = ?2 AND topic_id = ?3 AND id = ?4
    "#,
        params![
            question.course_id,
            question.unit_id,
            question.topic_id,
            question.question_id,
        ],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn row_to_course(row: &rusqlite::Row) -> Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        title: row.get(1)?,
        subject: row.get(2)?,
        description: row.get(3)?,
    })
}

fn row_to_question(row: &rusqlite::Row) -> Result<Question> {
    let choices_json: String = row.get(5)?;
    let choices: Vec<String> = serde_json::from_str(&choices_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Question {
        id: row.get(0)?,
        course_id: row.get(1)?,
        unit_id: row.get(2)?,
        topic_id: row.get(3)?,
        prompt: row.get(4)?,
        choices,
        answer_index: row.get(6)?,
        explanation: row.get(7)?,
    })
}

pub fn seed_catalog(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }

    for (id, title, subject, description) in get_course_seed_data() {
        conn.execute(
            "INSERT INTO courses (id, title, subject, description) VALUES (?1, ?2, ?3, ?4)",
            params![id, title, subject, description],
        )?;
    }

    for (course_id, id, title, position) in get_unit_seed_data() {
        conn.execute(
            "INSERT INTO units (id, course_id, title, position) VALUES (?1, ?2, ?3, ?4)",
            params![id, course_id, title, position],
        )?;
    }

    for (course_id, unit_id, id, title, position) in get_topic_seed_data() {
        conn.execute(
            "INSERT INTO topics (id, course_id, unit_id, title, position) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, course_id, unit_id, title, position],
        )?;
    }

    for seed in get_question_seed_data() {
        let choices_json = serde_json::to_string(&seed.choices).map_err(|e| {
            rusqlite::Error::ToSqlConversionFailure(Box::new(e))
        })?;
        conn.execute(
            r#"
      INSERT INTO questions (id, course_id, unit_id, topic_id, prompt, choices, answer_index, explanation)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
      "#,
            params![
                seed.id,
                seed.course_id,
                seed.unit_id,
                seed.topic_id,
                seed.prompt,
                choices_json,
                seed.answer_index,
                seed.explanation,
            ],
        )?;
    }

    Ok(())
}

struct QuestionSeed {
    course_id: &'static str,
    unit_id: &'static str,
    topic_id: &'static str,
    id: &'static str,
    prompt: &'static str,
    choices: [&'static str; 4],
    answer_index: i64,
    explanation: Option<&'static str>,
}

fn get_course_seed_data() -> [(&'static str, &'static str, &'static str, &'static str); 2] {
    [
        (
            "ap-biology",
            "AP Biology",
            "Science",
            "Cell biology, genetics, evolution, and ecology at the AP level",
        ),
        (
            "ap-ush",
            "AP United States History",
            "History",
            "U.S. history from pre-Columbian societies to the present",
        ),
    ]
}

fn get_unit_seed_data() -> [(&'static str, &'static str, &'static str, i64); 4] {
    [
        ("ap-biology", "unit-1", "Chemistry of Life", 1),
        ("ap-biology", "unit-2", "Cell Structure and Function", 2),
        ("ap-ush", "period-1", "1491-1607", 1),
        ("ap-ush", "period-3", "1754-1800", 2),
    ]
}

fn get_topic_seed_data() -> [(&'static str, &'static str, &'static str, &'static str, i64); 6] {
    [
        ("ap-biology", "unit-1", "water", "Structure of Water and Hydrogen Bonding", 1),
        ("ap-biology", "unit-1", "macromolecules", "Biological Macromolecules", 2),
        ("ap-biology", "unit-2", "organelles", "Cell Organelles", 1),
        ("ap-ush", "period-1", "native-societies", "Native American Societies", 1),
        ("ap-ush", "period-3", "revolution", "The American Revolution", 1),
        ("ap-ush", "period-3", "constitution", "The Constitution", 2),
    ]
}

fn get_question_seed_data() -> Vec<QuestionSeed> {
    vec![
        QuestionSeed {
            course_id: "ap-biology",
            unit_id: "unit-1",
            topic_id: "water",
            id: "q1",
            prompt: "Which property of water results directly from hydrogen bonding between molecules?",
            choices: ["Cohesion", "Low specific heat", "Nonpolarity", "Hydrophobicity"],
            answer_index: 0,
            explanation: Some("Hydrogen bonds hold water molecules together, producing cohesion and surface tension."),
        },
        QuestionSeed {
            course_id: "ap-biology",
            unit_id: "unit-1",
            topic_id: "water",
            id: "q2",
            prompt: "Water is an effective solvent for ionic compounds because it is",
            choices: ["nonpolar", "polar", "hydrophobic", "a macromolecule"],
            answer_index: 1,
            explanation: None,
        },
        QuestionSeed {
            course_id: "ap-biology",
            unit_id: "unit-1",
            topic_id: "macromolecules",
            id: "q1",
            prompt: "Which monomer builds proteins?",
            choices: ["Monosaccharides", "Nucleotides", "Amino acids", "Fatty acids"],
            answer_index: 2,
            explanation: None,
        },
        QuestionSeed {
            course_id: "ap-biology",
            unit_id: "unit-1",
            topic_id: "macromolecules",
            id: "q2",
            prompt: "DNA and RNA are polymers of",
            choices: ["amino acids", "glycerol", "nucleotides", "glucose"],
            answer_index: 2,
            explanation: None,
        },
        QuestionSeed {
            course_id: "ap-biology",
            unit_id: "unit-2",
            topic_id: "organelles",
            id: "q1",
            prompt: "Which organelle is the site of ATP synthesis by cellular respiration?",
            choices: ["Ribosome", "Mitochondrion", "Golgi apparatus", "Lysosome"],
            answer_index: 1,
            explanation: Some("The electron transport chain on the inner mitochondrial membrane drives ATP synthase."),
        },
        QuestionSeed {
            course_id: "ap-biology",
            unit_id: "unit-2",
            topic_id: "organelles",
            id: "q2",
            prompt: "Rough endoplasmic reticulum is distinguished from smooth ER by the presence of",
            choices: ["ribosomes", "cristae", "thylakoids", "centrioles"],
            answer_index: 0,
            explanation: None,
        },
        QuestionSeed {
            course_id: "ap-ush",
            unit_id: "period-1",
            topic_id: "native-societies",
            id: "q1",
            prompt: "Maize cultivation spread north from Mesoamerica and primarily enabled which change in the Southwest?",
            choices: [
                "Nomadic hunting economies",
                "Permanent settlements and irrigation",
                "Maritime trade networks",
                "Iron toolmaking",
            ],
            answer_index: 1,
            explanation: Some("Maize supported economic development, settlement, and advanced irrigation among Southwest societies."),
        },
        QuestionSeed {
            course_id: "ap-ush",
            unit_id: "period-3",
            topic_id: "revolution",
            id: "q1",
            prompt: "The Stamp Act of 1765 provoked colonial opposition chiefly because it",
            choices: [
                "taxed the colonies without their consent",
                "banned westward settlement",
                "closed the port of Boston",
                "quartered troops in private homes",
            ],
            answer_index: 0,
            explanation: None,
        },
        QuestionSeed {
            course_id: "ap-ush",
            unit_id: "period-3",
            topic_id: "revolution",
            id: "q2",
            prompt: "Thomas Paine's Common Sense argued for",
            choices: [
                "reconciliation with Britain",
                "immediate independence",
                "a stronger colonial assembly within the empire",
                "an alliance with Spain",
            ],
            answer_index: 1,
            explanation: None,
        },
        QuestionSeed {
            course_id: "ap-ush",
            unit_id: "period-3",
            topic_id: "constitution",
            id: "q1",
            prompt: "The Great Compromise at the Constitutional Convention resolved the dispute over",
            choices: [
                "slavery in the territories",
                "representation in Congress",
                "control of interstate commerce",
                "the method of electing the president",
            ],
            answer_index: 1,
            explanation: Some("It paired proportional representation in the House with equal state representation in the Senate."),
        },
    ]
}
