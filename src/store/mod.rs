//! Row-level persistence. Every lookup that reaches tenant data takes the
//! institution id and filters by it; callers never see cross-tenant rows.

pub mod directory;
pub mod learnings;
pub mod templates;
pub mod valuations;

use rusqlite::{params_from_iter, Connection};
use std::collections::HashMap;

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Batch fetch `id -> column` for a set of ids. `select` must be
/// `SELECT id, <col> FROM <table>`; the IN clause is appended here.
pub(crate) fn lookup_by_ids(
    conn: &Connection,
    select: &str,
    ids: &[&str],
) -> rusqlite::Result<HashMap<String, String>> {
    let mut out = HashMap::new();
    if ids.is_empty() {
        return Ok(out);
    }
    let mut unique: Vec<&str> = ids.to_vec();
    unique.sort_unstable();
    unique.dedup();

    let placeholders = vec!["?"; unique.len()].join(", ");
    let sql = format!("{} WHERE id IN ({})", select, placeholders);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(unique.iter()), |r| {
        Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
    })?;
    for row in rows {
        let (id, value) = row?;
        out.insert(id, value);
    }
    Ok(out)
}
