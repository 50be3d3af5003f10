use crate::model::{
    GlobalStatus, LearningValuation, QualitativeValuation, StudentValuation, SubjectValuation,
};
use rusqlite::{Connection, OptionalExtension};

const HEADER_COLUMNS: &str = "id, institution_id, student_id, teacher_id, checklist_template_id,
    period_id, global_status, created_at, updated_at";

fn bad_enum(col: usize, raw: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        col,
        rusqlite::types::Type::Text,
        format!("unexpected value {raw:?}").into(),
    )
}

fn header_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<StudentValuation> {
    let status_raw: String = r.get(6)?;
    let global_status = GlobalStatus::parse(&status_raw).ok_or_else(|| bad_enum(6, &status_raw))?;
    Ok(StudentValuation {
        id: r.get(0)?,
        institution_id: r.get(1)?,
        student_id: r.get(2)?,
        teacher_id: r.get(3)?,
        checklist_template_id: r.get(4)?,
        period_id: r.get(5)?,
        global_status,
        valuations_by_subject: Vec::new(),
        created_at: r.get(7)?,
        updated_at: r.get(8)?,
    })
}

fn load_subjects(conn: &Connection, valuation: &mut StudentValuation) -> rusqlite::Result<()> {
    let mut subj_stmt = conn.prepare(
        "SELECT subject_order, subject_id, max_subject_score, total_subject_score,
                subject_percentage, assigned_concept_id
         FROM valuation_subjects
         WHERE valuation_id = ?
         ORDER BY subject_order",
    )?;
    let subjects = subj_stmt
        .query_map([&valuation.id], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                SubjectValuation {
                    subject_id: r.get(1)?,
                    max_subject_score: r.get(2)?,
                    total_subject_score: r.get(3)?,
                    subject_percentage: r.get(4)?,
                    assigned_concept_id: r.get(5)?,
                    learning_valuations: Vec::new(),
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut learn_stmt = conn.prepare(
        "SELECT learning_id, qualitative_valuation, points_obtained
         FROM valuation_learnings
         WHERE valuation_id = ? AND subject_order = ?
         ORDER BY learning_order",
    )?;
    let mut out = Vec::with_capacity(subjects.len());
    for (order, mut subject) in subjects {
        subject.learning_valuations = learn_stmt
            .query_map((&valuation.id, order), |r| {
                let raw: Option<String> = r.get(1)?;
                let qualitative_valuation = match raw {
                    Some(s) => Some(QualitativeValuation::parse(&s).ok_or_else(|| bad_enum(1, &s))?),
                    None => None,
                };
                Ok(LearningValuation {
                    learning_id: r.get(0)?,
                    qualitative_valuation,
                    points_obtained: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        out.push(subject);
    }
    valuation.valuations_by_subject = out;
    Ok(())
}

fn find_one(
    conn: &Connection,
    where_clause: &str,
    params: &[&str],
) -> rusqlite::Result<Option<StudentValuation>> {
    let header = conn
        .query_row(
            &format!("SELECT {HEADER_COLUMNS} FROM student_valuations WHERE {where_clause}"),
            rusqlite::params_from_iter(params.iter()),
            header_from_row,
        )
        .optional()?;
    match header {
        Some(mut v) => {
            load_subjects(conn, &mut v)?;
            Ok(Some(v))
        }
        None => Ok(None),
    }
}

pub fn find_by_id(
    conn: &Connection,
    valuation_id: &str,
    institution_id: &str,
) -> rusqlite::Result<Option<StudentValuation>> {
    find_one(
        conn,
        "id = ? AND institution_id = ?",
        &[valuation_id, institution_id],
    )
}

pub fn find_by_student_period(
    conn: &Connection,
    student_id: &str,
    period_id: &str,
    institution_id: &str,
) -> rusqlite::Result<Option<StudentValuation>> {
    find_one(
        conn,
        "student_id = ? AND period_id = ? AND institution_id = ?",
        &[student_id, period_id, institution_id],
    )
}

pub fn list_by_student(
    conn: &Connection,
    student_id: &str,
    institution_id: &str,
) -> rusqlite::Result<Vec<StudentValuation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {HEADER_COLUMNS}
         FROM student_valuations
         WHERE student_id = ? AND institution_id = ?
         ORDER BY created_at, rowid"
    ))?;
    let mut headers = stmt
        .query_map([student_id, institution_id], header_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    for v in headers.iter_mut() {
        load_subjects(conn, v)?;
    }
    Ok(headers)
}

fn insert_children(conn: &Connection, v: &StudentValuation) -> rusqlite::Result<()> {
    let mut subj_stmt = conn.prepare(
        "INSERT INTO valuation_subjects(valuation_id, subject_order, subject_id, max_subject_score,
           total_subject_score, subject_percentage, assigned_concept_id)
         VALUES(?, ?, ?, ?, ?, ?, ?)",
    )?;
    let mut learn_stmt = conn.prepare(
        "INSERT INTO valuation_learnings(valuation_id, subject_order, learning_order, learning_id,
           qualitative_valuation, points_obtained)
         VALUES(?, ?, ?, ?, ?, ?)",
    )?;
    for (si, s) in v.valuations_by_subject.iter().enumerate() {
        subj_stmt.execute((
            &v.id,
            si as i64,
            &s.subject_id,
            s.max_subject_score,
            s.total_subject_score,
            s.subject_percentage,
            &s.assigned_concept_id,
        ))?;
        for (li, lv) in s.learning_valuations.iter().enumerate() {
            learn_stmt.execute((
                &v.id,
                si as i64,
                li as i64,
                &lv.learning_id,
                lv.qualitative_valuation.map(|q| q.as_str()),
                lv.points_obtained,
            ))?;
        }
    }
    Ok(())
}

/// Insert a new valuation with its subjects and learnings atomically.
///
/// A second valuation for the same (student, period) fails with a UNIQUE
/// constraint violation; see `ServiceError::is_unique_violation`.
pub fn insert(conn: &Connection, v: &StudentValuation) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO student_valuations(id, institution_id, student_id, teacher_id,
           checklist_template_id, period_id, global_status, created_at, updated_at)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &v.id,
            &v.institution_id,
            &v.student_id,
            &v.teacher_id,
            &v.checklist_template_id,
            &v.period_id,
            v.global_status.as_str(),
            &v.created_at,
            &v.updated_at,
        ),
    )?;
    insert_children(&tx, v)?;
    tx.commit()
}

/// Overwrite the mutable state of an existing valuation. Last writer wins.
pub fn save(conn: &Connection, v: &StudentValuation) -> rusqlite::Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let changed = tx.execute(
        "UPDATE student_valuations SET global_status = ?, updated_at = ?
         WHERE id = ? AND institution_id = ?",
        (
            v.global_status.as_str(),
            &v.updated_at,
            &v.id,
            &v.institution_id,
        ),
    )?;
    if changed == 0 {
        return Ok(0);
    }
    {
        let mut subj_stmt = tx.prepare(
            "UPDATE valuation_subjects
             SET total_subject_score = ?, subject_percentage = ?, assigned_concept_id = ?
             WHERE valuation_id = ? AND subject_order = ?",
        )?;
        let mut learn_stmt = tx.prepare(
            "UPDATE valuation_learnings
             SET qualitative_valuation = ?, points_obtained = ?
             WHERE valuation_id = ? AND subject_order = ? AND learning_order = ?",
        )?;
        for (si, s) in v.valuations_by_subject.iter().enumerate() {
            subj_stmt.execute((
                s.total_subject_score,
                s.subject_percentage,
                &s.assigned_concept_id,
                &v.id,
                si as i64,
            ))?;
            for (li, lv) in s.learning_valuations.iter().enumerate() {
                learn_stmt.execute((
                    lv.qualitative_valuation.map(|q| q.as_str()),
                    lv.points_obtained,
                    &v.id,
                    si as i64,
                    li as i64,
                ))?;
            }
        }
    }
    tx.commit()?;
    Ok(changed)
}

/// Hard delete of one valuation and its nested rows. Returns rows removed
/// from `student_valuations` (0 when absent or owned by another tenant).
pub fn delete(conn: &Connection, valuation_id: &str, institution_id: &str) -> rusqlite::Result<usize> {
    let owned: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM student_valuations WHERE id = ? AND institution_id = ?",
            [valuation_id, institution_id],
            |r| r.get(0),
        )
        .optional()?;
    if owned.is_none() {
        return Ok(0);
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM valuation_learnings WHERE valuation_id = ?",
        [valuation_id],
    )?;
    tx.execute(
        "DELETE FROM valuation_subjects WHERE valuation_id = ?",
        [valuation_id],
    )?;
    let n = tx.execute(
        "DELETE FROM student_valuations WHERE id = ? AND institution_id = ?",
        [valuation_id, institution_id],
    )?;
    tx.commit()?;
    Ok(n)
}
