use crate::model::{ChecklistTemplate, SubjectGroup};
use rusqlite::{Connection, OptionalExtension};

#[derive(Debug, Clone)]
struct TemplateHeader {
    id: String,
    institution_id: String,
    period_id: String,
    teacher_id: String,
    name: String,
    created_at: String,
}

const HEADER_COLUMNS: &str = "id, institution_id, period_id, teacher_id, name, created_at";

fn header_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<TemplateHeader> {
    Ok(TemplateHeader {
        id: r.get(0)?,
        institution_id: r.get(1)?,
        period_id: r.get(2)?,
        teacher_id: r.get(3)?,
        name: r.get(4)?,
        created_at: r.get(5)?,
    })
}

fn load_subjects(conn: &Connection, template_id: &str) -> rusqlite::Result<Vec<SubjectGroup>> {
    let mut stmt = conn.prepare(
        "SELECT subject_order, subject_id, learning_id
         FROM checklist_template_learnings
         WHERE template_id = ?
         ORDER BY subject_order, learning_order",
    )?;
    let rows = stmt
        .query_map([template_id], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut groups: Vec<SubjectGroup> = Vec::new();
    let mut current_order: Option<i64> = None;
    for (order, subject_id, learning_id) in rows {
        if current_order != Some(order) {
            groups.push(SubjectGroup {
                subject_id,
                learnings: Vec::new(),
            });
            current_order = Some(order);
        }
        if let Some(g) = groups.last_mut() {
            g.learnings.push(learning_id);
        }
    }
    Ok(groups)
}

fn hydrate(conn: &Connection, h: TemplateHeader) -> rusqlite::Result<ChecklistTemplate> {
    let subjects = load_subjects(conn, &h.id)?;
    Ok(ChecklistTemplate {
        id: h.id,
        institution_id: h.institution_id,
        period_id: h.period_id,
        teacher_id: h.teacher_id,
        name: h.name,
        created_at: h.created_at,
        subjects,
    })
}

pub fn insert(conn: &Connection, t: &ChecklistTemplate) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO checklist_templates(id, institution_id, period_id, teacher_id, name, created_at)
         VALUES(?, ?, ?, ?, ?, ?)",
        (
            &t.id,
            &t.institution_id,
            &t.period_id,
            &t.teacher_id,
            &t.name,
            &t.created_at,
        ),
    )?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO checklist_template_learnings(template_id, subject_id, subject_order,
               learning_id, learning_order)
             VALUES(?, ?, ?, ?, ?)",
        )?;
        for (si, group) in t.subjects.iter().enumerate() {
            for (li, learning_id) in group.learnings.iter().enumerate() {
                stmt.execute((&t.id, &group.subject_id, si as i64, learning_id, li as i64))?;
            }
        }
    }
    tx.commit()
}

pub fn find_by_id(
    conn: &Connection,
    template_id: &str,
    institution_id: &str,
) -> rusqlite::Result<Option<ChecklistTemplate>> {
    let header = conn
        .query_row(
            &format!(
                "SELECT {HEADER_COLUMNS} FROM checklist_templates WHERE id = ? AND institution_id = ?"
            ),
            [template_id, institution_id],
            header_from_row,
        )
        .optional()?;
    header.map(|h| hydrate(conn, h)).transpose()
}

/// The template a teacher evaluates a period with. When several exist the
/// newest wins.
pub fn find_for_teacher_period(
    conn: &Connection,
    teacher_id: &str,
    period_id: &str,
    institution_id: &str,
) -> rusqlite::Result<Option<ChecklistTemplate>> {
    let header = conn
        .query_row(
            &format!(
                "SELECT {HEADER_COLUMNS}
                 FROM checklist_templates
                 WHERE teacher_id = ? AND period_id = ? AND institution_id = ?
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT 1"
            ),
            [teacher_id, period_id, institution_id],
            header_from_row,
        )
        .optional()?;
    header.map(|h| hydrate(conn, h)).transpose()
}

pub fn list_for_teacher(
    conn: &Connection,
    teacher_id: &str,
    institution_id: &str,
) -> rusqlite::Result<Vec<ChecklistTemplate>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {HEADER_COLUMNS}
         FROM checklist_templates
         WHERE teacher_id = ? AND institution_id = ?
         ORDER BY created_at, rowid"
    ))?;
    let headers = stmt
        .query_map([teacher_id, institution_id], header_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    headers.into_iter().map(|h| hydrate(conn, h)).collect()
}
