use crate::model::Role;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub school_id: Option<String>,
    pub role: Role,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default)]
    pub second_last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub id: String,
    pub name: String,
    #[serde(default = "default_subject_kind")]
    pub kind: String,
}

fn default_true() -> bool {
    true
}

fn default_subject_kind() -> String {
    "SUBJECT".to_string()
}

fn user_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
    let role_raw: String = r.get(2)?;
    let role = Role::parse(&role_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown role {role_raw}").into(),
        )
    })?;
    Ok(UserRecord {
        id: r.get(0)?,
        school_id: r.get(1)?,
        role,
        first_name: r.get(3)?,
        middle_name: r.get(4)?,
        last_name: r.get(5)?,
        second_last_name: r.get(6)?,
    })
}

const USER_COLUMNS: &str =
    "id, school_id, role, first_name, middle_name, last_name, second_last_name";

/// Unscoped batch fetch: a valuation's students are resolved by id alone.
pub fn find_users(
    conn: &Connection,
    ids: &[&str],
) -> rusqlite::Result<HashMap<String, UserRecord>> {
    let mut out = HashMap::new();
    if ids.is_empty() {
        return Ok(out);
    }
    let mut unique: Vec<&str> = ids.to_vec();
    unique.sort_unstable();
    unique.dedup();

    let placeholders = vec!["?"; unique.len()].join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id IN ({placeholders})"
    ))?;
    let rows = stmt.query_map(params_from_iter(unique.iter()), user_from_row)?;
    for row in rows {
        let user = row?;
        out.insert(user.id.clone(), user);
    }
    Ok(out)
}

pub fn find_user_in_institution(
    conn: &Connection,
    user_id: &str,
    institution_id: &str,
) -> rusqlite::Result<Option<UserRecord>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ? AND institution_id = ?"),
        [user_id, institution_id],
        user_from_row,
    )
    .optional()
}

pub fn period_exists(
    conn: &Connection,
    period_id: &str,
    institution_id: &str,
) -> rusqlite::Result<bool> {
    let hit: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM periods WHERE id = ? AND institution_id = ?",
            [period_id, institution_id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(hit.is_some())
}

pub fn subject_exists(
    conn: &Connection,
    subject_id: &str,
    institution_id: &str,
) -> rusqlite::Result<bool> {
    let hit: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM subjects WHERE id = ? AND institution_id = ?",
            [subject_id, institution_id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(hit.is_some())
}

pub fn period_names(conn: &Connection, ids: &[&str]) -> rusqlite::Result<HashMap<String, String>> {
    super::lookup_by_ids(conn, "SELECT id, name FROM periods", ids)
}

pub fn subject_names(conn: &Connection, ids: &[&str]) -> rusqlite::Result<HashMap<String, String>> {
    super::lookup_by_ids(conn, "SELECT id, name FROM subjects", ids)
}

pub fn list_periods(conn: &Connection, institution_id: &str) -> rusqlite::Result<Vec<PeriodRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, start_date, end_date, is_active
         FROM periods
         WHERE institution_id = ?
         ORDER BY COALESCE(start_date, ''), name",
    )?;
    let rows = stmt
        .query_map([institution_id], |r| {
            Ok(PeriodRecord {
                id: r.get(0)?,
                name: r.get(1)?,
                start_date: r.get(2)?,
                end_date: r.get(3)?,
                is_active: r.get::<_, i64>(4)? != 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_subjects(conn: &Connection, institution_id: &str) -> rusqlite::Result<Vec<SubjectRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, kind FROM subjects WHERE institution_id = ? ORDER BY name",
    )?;
    let rows = stmt
        .query_map([institution_id], |r| {
            Ok(SubjectRecord {
                id: r.get(0)?,
                name: r.get(1)?,
                kind: r.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Insert or refresh a record owned by `institution_id`. Returns false, writing
/// nothing, when the id already belongs to another institution.
pub fn upsert_user(conn: &Connection, institution_id: &str, u: &UserRecord) -> rusqlite::Result<bool> {
    let n = conn.execute(
        "INSERT INTO users(id, institution_id, school_id, role, first_name, middle_name, last_name, second_last_name)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
           school_id = excluded.school_id,
           role = excluded.role,
           first_name = excluded.first_name,
           middle_name = excluded.middle_name,
           last_name = excluded.last_name,
           second_last_name = excluded.second_last_name
         WHERE users.institution_id = excluded.institution_id",
        (
            &u.id,
            institution_id,
            &u.school_id,
            u.role.as_str(),
            &u.first_name,
            &u.middle_name,
            &u.last_name,
            &u.second_last_name,
        ),
    )?;
    Ok(n > 0)
}

pub fn upsert_period(conn: &Connection, institution_id: &str, p: &PeriodRecord) -> rusqlite::Result<bool> {
    let n = conn.execute(
        "INSERT INTO periods(id, institution_id, name, start_date, end_date, is_active)
         VALUES(?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           start_date = excluded.start_date,
           end_date = excluded.end_date,
           is_active = excluded.is_active
         WHERE periods.institution_id = excluded.institution_id",
        (
            &p.id,
            institution_id,
            &p.name,
            &p.start_date,
            &p.end_date,
            p.is_active as i64,
        ),
    )?;
    Ok(n > 0)
}

pub fn upsert_subject(conn: &Connection, institution_id: &str, s: &SubjectRecord) -> rusqlite::Result<bool> {
    let n = conn.execute(
        "INSERT INTO subjects(id, institution_id, name, kind)
         VALUES(?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           kind = excluded.kind
         WHERE subjects.institution_id = excluded.institution_id",
        (&s.id, institution_id, &s.name, &s.kind),
    )?;
    Ok(n > 0)
}
