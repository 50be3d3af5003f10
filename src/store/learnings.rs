use crate::model::ExpectedLearning;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::collections::HashMap;

/// Id and subject of one learning in a period, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningRef {
    pub id: String,
    pub subject_id: String,
}

#[derive(Debug, Default, Clone)]
pub struct LearningFilter {
    pub period_id: Option<String>,
    pub subject_id: Option<String>,
}

const COLUMNS: &str = "id, institution_id, subject_id, period_id, description, grade,
    created_by, created_at, updated_at";

fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<ExpectedLearning> {
    Ok(ExpectedLearning {
        id: r.get(0)?,
        institution_id: r.get(1)?,
        subject_id: r.get(2)?,
        period_id: r.get(3)?,
        description: r.get(4)?,
        grade: r.get(5)?,
        created_by: r.get(6)?,
        created_at: r.get(7)?,
        updated_at: r.get(8)?,
    })
}

pub fn insert(conn: &Connection, l: &ExpectedLearning) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO expected_learnings(id, institution_id, subject_id, period_id, description,
           grade, created_by, created_at, updated_at)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &l.id,
            &l.institution_id,
            &l.subject_id,
            &l.period_id,
            &l.description,
            &l.grade,
            &l.created_by,
            &l.created_at,
            &l.updated_at,
        ),
    )?;
    Ok(())
}

pub fn find(
    conn: &Connection,
    learning_id: &str,
    institution_id: &str,
) -> rusqlite::Result<Option<ExpectedLearning>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM expected_learnings WHERE id = ? AND institution_id = ?"),
        [learning_id, institution_id],
        from_row,
    )
    .optional()
}

pub fn list(
    conn: &Connection,
    institution_id: &str,
    filter: &LearningFilter,
) -> rusqlite::Result<Vec<ExpectedLearning>> {
    let mut sql = format!("SELECT {COLUMNS} FROM expected_learnings WHERE institution_id = ?");
    let mut bind: Vec<Value> = vec![Value::Text(institution_id.to_string())];
    if let Some(p) = filter.period_id.as_ref() {
        sql.push_str(" AND period_id = ?");
        bind.push(Value::Text(p.clone()));
    }
    if let Some(s) = filter.subject_id.as_ref() {
        sql.push_str(" AND subject_id = ?");
        bind.push(Value::Text(s.clone()));
    }
    sql.push_str(" ORDER BY rowid");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(bind), from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// All learnings of a period, oldest first.
pub fn refs_for_period(
    conn: &Connection,
    period_id: &str,
    institution_id: &str,
) -> rusqlite::Result<Vec<LearningRef>> {
    let mut stmt = conn.prepare(
        "SELECT id, subject_id
         FROM expected_learnings
         WHERE period_id = ? AND institution_id = ?
         ORDER BY rowid",
    )?;
    let rows = stmt
        .query_map([period_id, institution_id], |r| {
            Ok(LearningRef {
                id: r.get(0)?,
                subject_id: r.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn descriptions(conn: &Connection, ids: &[&str]) -> rusqlite::Result<HashMap<String, String>> {
    super::lookup_by_ids(conn, "SELECT id, description FROM expected_learnings", ids)
}

pub fn update(conn: &Connection, l: &ExpectedLearning) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE expected_learnings
         SET subject_id = ?, period_id = ?, description = ?, grade = ?, updated_at = ?
         WHERE id = ? AND institution_id = ?",
        (
            &l.subject_id,
            &l.period_id,
            &l.description,
            &l.grade,
            &l.updated_at,
            &l.id,
            &l.institution_id,
        ),
    )
}

pub fn delete(conn: &Connection, learning_id: &str, institution_id: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM expected_learnings WHERE id = ? AND institution_id = ?",
        [learning_id, institution_id],
    )
}
