use crate::error::{ServiceError, ServiceResult};
use crate::model::{ExpectedLearning, Principal};
use crate::store::learnings::LearningFilter;
use crate::store::{self, directory, learnings};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLearning {
    pub subject_id: String,
    pub period_id: String,
    pub description: String,
    pub grade: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPatch {
    pub subject_id: Option<String>,
    pub period_id: Option<String>,
    pub description: Option<String>,
    pub grade: Option<String>,
}

/// An expected learning with its subject and period names resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningView {
    #[serde(flatten)]
    pub learning: ExpectedLearning,
    pub subject_name: Option<String>,
    pub period_name: Option<String>,
}

fn non_empty(field: &str, value: &str) -> ServiceResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ServiceError::validation(format!("{field} must not be empty")));
    }
    Ok(v.to_string())
}

fn check_refs(
    conn: &Connection,
    institution_id: &str,
    subject_id: Option<&str>,
    period_id: Option<&str>,
) -> ServiceResult<()> {
    if let Some(s) = subject_id {
        if !directory::subject_exists(conn, s, institution_id)? {
            return Err(ServiceError::not_found("subject"));
        }
    }
    if let Some(p) = period_id {
        if !directory::period_exists(conn, p, institution_id)? {
            return Err(ServiceError::not_found("period"));
        }
    }
    Ok(())
}

pub fn create(
    conn: &Connection,
    principal: &Principal,
    input: &NewLearning,
) -> ServiceResult<ExpectedLearning> {
    let description = non_empty("description", &input.description)?;
    let grade = non_empty("grade", &input.grade)?;
    let institution_id = principal.institution_id.as_str();
    check_refs(
        conn,
        institution_id,
        Some(&input.subject_id),
        Some(&input.period_id),
    )?;

    let now = store::now_rfc3339();
    let learning = ExpectedLearning {
        id: store::new_id(),
        institution_id: institution_id.to_string(),
        subject_id: input.subject_id.clone(),
        period_id: input.period_id.clone(),
        description,
        grade,
        created_by: Some(principal.user_id.clone()),
        created_at: now.clone(),
        updated_at: now,
    };
    learnings::insert(conn, &learning)?;
    tracing::info!(learning_id = %learning.id, period_id = %learning.period_id, "expected learning created");
    Ok(learning)
}

pub fn list(
    conn: &Connection,
    institution_id: &str,
    filter: &LearningFilter,
) -> ServiceResult<Vec<LearningView>> {
    let rows = learnings::list(conn, institution_id, filter)?;
    let subject_ids: Vec<&str> = rows.iter().map(|l| l.subject_id.as_str()).collect();
    let period_ids: Vec<&str> = rows.iter().map(|l| l.period_id.as_str()).collect();
    let subject_names = directory::subject_names(conn, &subject_ids)?;
    let period_names = directory::period_names(conn, &period_ids)?;

    Ok(rows
        .into_iter()
        .map(|l| LearningView {
            subject_name: subject_names.get(&l.subject_id).cloned(),
            period_name: period_names.get(&l.period_id).cloned(),
            learning: l,
        })
        .collect())
}

pub fn update(
    conn: &Connection,
    learning_id: &str,
    institution_id: &str,
    patch: &LearningPatch,
) -> ServiceResult<ExpectedLearning> {
    let mut learning = learnings::find(conn, learning_id, institution_id)?
        .ok_or_else(|| ServiceError::not_found("learning"))?;
    check_refs(
        conn,
        institution_id,
        patch.subject_id.as_deref(),
        patch.period_id.as_deref(),
    )?;

    if let Some(s) = patch.subject_id.as_ref() {
        learning.subject_id = s.clone();
    }
    if let Some(p) = patch.period_id.as_ref() {
        learning.period_id = p.clone();
    }
    if let Some(d) = patch.description.as_deref() {
        learning.description = non_empty("description", d)?;
    }
    if let Some(g) = patch.grade.as_deref() {
        learning.grade = non_empty("grade", g)?;
    }
    learning.updated_at = store::now_rfc3339();
    learnings::update(conn, &learning)?;
    Ok(learning)
}

/// Hard delete. Templates and valuations keep the id and show it as deleted.
pub fn delete(conn: &Connection, learning_id: &str, institution_id: &str) -> ServiceResult<()> {
    if learnings::delete(conn, learning_id, institution_id)? == 0 {
        return Err(ServiceError::not_found("learning"));
    }
    tracing::info!(learning_id, "expected learning deleted");
    Ok(())
}
