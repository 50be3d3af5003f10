use crate::error::{ServiceError, ServiceResult};
use crate::store::directory::{self, PeriodRecord, SubjectRecord, UserRecord};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryImport {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub periods: Vec<PeriodRecord>,
    #[serde(default)]
    pub subjects: Vec<SubjectRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub users: usize,
    pub periods: usize,
    pub subjects: usize,
}

fn owned(written: bool, entity: &'static str, id: &str) -> ServiceResult<()> {
    if written {
        return Ok(());
    }
    Err(ServiceError::ForeignId {
        entity,
        id: id.to_string(),
    })
}

/// Upsert a roster export into the caller's institution in one transaction.
/// An id already owned by another institution aborts the whole import.
pub fn import(
    conn: &Connection,
    institution_id: &str,
    payload: &DirectoryImport,
) -> ServiceResult<ImportSummary> {
    let tx = conn.unchecked_transaction()?;
    for u in &payload.users {
        owned(directory::upsert_user(&tx, institution_id, u)?, "user", &u.id)?;
    }
    for p in &payload.periods {
        owned(directory::upsert_period(&tx, institution_id, p)?, "period", &p.id)?;
    }
    for s in &payload.subjects {
        owned(directory::upsert_subject(&tx, institution_id, s)?, "subject", &s.id)?;
    }
    tx.commit()?;

    let summary = ImportSummary {
        users: payload.users.len(),
        periods: payload.periods.len(),
        subjects: payload.subjects.len(),
    };
    tracing::info!(
        institution_id,
        users = summary.users,
        periods = summary.periods,
        subjects = summary.subjects,
        "directory imported"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_db;
    use crate::model::{GlobalStatus, Role, StudentValuation};
    use crate::service::populate;

    fn roster(student_name: &str, period_name: &str) -> DirectoryImport {
        DirectoryImport {
            users: vec![UserRecord {
                id: "s1".into(),
                school_id: None,
                role: Role::Student,
                first_name: student_name.into(),
                middle_name: None,
                last_name: "Rojas".into(),
                second_last_name: None,
            }],
            periods: vec![PeriodRecord {
                id: "p1".into(),
                name: period_name.into(),
                start_date: None,
                end_date: None,
                is_active: true,
            }],
            subjects: vec![SubjectRecord {
                id: "math".into(),
                name: "Matematica".into(),
                kind: "SUBJECT".into(),
            }],
        }
    }

    #[test]
    fn reimport_refreshes_own_records() {
        let conn = temp_db("quartz-directory-reimport");
        import(&conn, "iA", &roster("Ana", "Primer semestre")).expect("first import");
        let summary = import(&conn, "iA", &roster("Ana Maria", "Semestre 1")).expect("reimport");
        assert_eq!(summary.users, 1);
        let user = directory::find_user_in_institution(&conn, "s1", "iA")
            .expect("lookup")
            .expect("user");
        assert_eq!(user.first_name, "Ana Maria");
    }

    #[test]
    fn foreign_ids_are_rejected_and_left_untouched() {
        let conn = temp_db("quartz-directory-foreign");
        import(&conn, "iA", &roster("Ana", "Primer semestre")).expect("tenant A import");

        let mut hostile = roster("Mallory", "Periodo B");
        hostile.users[0].id = "s2".into();
        let e = import(&conn, "iB", &hostile).expect_err("foreign period id");
        assert!(matches!(e, ServiceError::ForeignId { entity: "period", .. }));
        assert_eq!(e.code(), "conflict");
        assert_eq!(e.details()["id"], "p1");
        // The whole import rolled back, including the fresh user.
        assert!(directory::find_user_in_institution(&conn, "s2", "iB")
            .expect("lookup")
            .is_none());

        let e = import(&conn, "iB", &roster("Mallory", "Periodo B")).expect_err("foreign user id");
        assert!(matches!(e, ServiceError::ForeignId { entity: "user", .. }));

        assert!(directory::period_exists(&conn, "p1", "iA").expect("period"));
        assert!(directory::subject_exists(&conn, "math", "iA").expect("subject"));
        assert!(directory::find_user_in_institution(&conn, "s1", "iA")
            .expect("lookup")
            .is_some());

        let v = StudentValuation {
            id: "v1".into(),
            institution_id: "iA".into(),
            student_id: "s1".into(),
            teacher_id: "t1".into(),
            checklist_template_id: "ct1".into(),
            period_id: "p1".into(),
            global_status: GlobalStatus::NotStarted,
            valuations_by_subject: Vec::new(),
            created_at: "x".into(),
            updated_at: "x".into(),
        };
        let dto = populate::valuation_dto(&conn, v).expect("dto");
        assert_eq!(dto.student_name.first_name, "Ana");
        assert_eq!(dto.period_name, "Primer semestre");
    }
}
