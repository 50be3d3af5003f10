use crate::error::{ServiceError, ServiceResult};
use crate::model::Principal;
use crate::store::directory::{self, PeriodRecord, SubjectRecord, UserRecord};
use crate::store::templates;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub period_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub user: UserRecord,
    pub institution_id: String,
    /// From the principal when the host supplies one, else the user record.
    pub school_id: Option<String>,
    pub periods: Vec<PeriodRecord>,
    pub subjects: Vec<SubjectRecord>,
    pub checklist_templates: Vec<TemplateSummary>,
}

/// Everything a client needs right after sign-in.
pub fn snapshot(conn: &Connection, principal: &Principal) -> ServiceResult<SessionSnapshot> {
    let institution_id = principal.institution_id.as_str();
    let user = directory::find_user_in_institution(conn, &principal.user_id, institution_id)?
        .ok_or_else(|| ServiceError::not_found("user"))?;

    let school_id = principal.school_id.clone().or_else(|| user.school_id.clone());

    let checklist_templates = templates::list_for_teacher(conn, &principal.user_id, institution_id)?
        .into_iter()
        .map(|t| TemplateSummary {
            id: t.id,
            name: t.name,
            period_id: t.period_id,
        })
        .collect();

    Ok(SessionSnapshot {
        user,
        institution_id: institution_id.to_string(),
        school_id,
        periods: directory::list_periods(conn, institution_id)?,
        subjects: directory::list_subjects(conn, institution_id)?,
        checklist_templates,
    })
}
