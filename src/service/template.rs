use crate::error::{ServiceError, ServiceResult};
use crate::model::{
    ChecklistTemplate, ChecklistTemplateDto, Principal, SubjectGroup, TemplateLearningDto,
    TemplateSubjectDto,
};
use crate::service::populate::{LEARNING_PLACEHOLDER, SUBJECT_PLACEHOLDER};
use crate::store::learnings::LearningRef;
use crate::store::{self, directory, learnings, templates};
use rusqlite::Connection;
use std::collections::HashMap;

/// Group learnings by subject, keeping the order in which each subject first
/// appears and the order of learnings within it.
pub fn group_by_subject(refs: &[LearningRef]) -> Vec<SubjectGroup> {
    let mut slot: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<SubjectGroup> = Vec::new();
    for r in refs {
        let idx = *slot.entry(r.subject_id.as_str()).or_insert_with(|| {
            groups.push(SubjectGroup {
                subject_id: r.subject_id.clone(),
                learnings: Vec::new(),
            });
            groups.len() - 1
        });
        groups[idx].learnings.push(r.id.clone());
    }
    groups
}

/// Build a template's subject structure from every expected learning of the
/// period. Read-only; the caller persists.
pub fn derive_subjects(
    conn: &Connection,
    period_id: &str,
    institution_id: &str,
) -> ServiceResult<Vec<SubjectGroup>> {
    let refs = learnings::refs_for_period(conn, period_id, institution_id)?;
    if refs.is_empty() {
        return Err(ServiceError::EmptyPeriod {
            period_id: period_id.to_string(),
        });
    }
    Ok(group_by_subject(&refs))
}

#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub name: String,
    pub period_id: String,
}

pub fn create(
    conn: &Connection,
    principal: &Principal,
    input: &NewTemplate,
) -> ServiceResult<ChecklistTemplateDto> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ServiceError::validation("name must not be empty"));
    }
    let institution_id = principal.institution_id.as_str();
    if !directory::period_exists(conn, &input.period_id, institution_id)? {
        return Err(ServiceError::not_found("period"));
    }

    let subjects = derive_subjects(conn, &input.period_id, institution_id)?;
    let template = ChecklistTemplate {
        id: store::new_id(),
        institution_id: institution_id.to_string(),
        period_id: input.period_id.clone(),
        teacher_id: principal.user_id.clone(),
        name: name.to_string(),
        created_at: store::now_rfc3339(),
        subjects,
    };
    templates::insert(conn, &template)?;
    tracing::info!(
        template_id = %template.id,
        period_id = %template.period_id,
        subjects = template.subjects.len(),
        "checklist template created"
    );
    populate(conn, template)
}

pub fn get(
    conn: &Connection,
    template_id: &str,
    institution_id: &str,
) -> ServiceResult<ChecklistTemplateDto> {
    let template = templates::find_by_id(conn, template_id, institution_id)?
        .ok_or_else(|| ServiceError::not_found("checklist template"))?;
    populate(conn, template)
}

pub fn list_for_teacher(
    conn: &Connection,
    teacher_id: &str,
    institution_id: &str,
) -> ServiceResult<Vec<ChecklistTemplateDto>> {
    templates::list_for_teacher(conn, teacher_id, institution_id)?
        .into_iter()
        .map(|t| populate(conn, t))
        .collect()
}

fn populate(conn: &Connection, t: ChecklistTemplate) -> ServiceResult<ChecklistTemplateDto> {
    let subject_ids: Vec<&str> = t.subjects.iter().map(|s| s.subject_id.as_str()).collect();
    let learning_ids: Vec<&str> = t
        .subjects
        .iter()
        .flat_map(|s| s.learnings.iter().map(String::as_str))
        .collect();
    let subject_names = directory::subject_names(conn, &subject_ids)?;
    let descriptions = learnings::descriptions(conn, &learning_ids)?;

    let subjects = t
        .subjects
        .into_iter()
        .map(|s| TemplateSubjectDto {
            subject_name: subject_names
                .get(&s.subject_id)
                .cloned()
                .unwrap_or_else(|| SUBJECT_PLACEHOLDER.to_string()),
            learnings: s
                .learnings
                .into_iter()
                .map(|id| TemplateLearningDto {
                    description: descriptions
                        .get(&id)
                        .cloned()
                        .unwrap_or_else(|| LEARNING_PLACEHOLDER.to_string()),
                    id,
                })
                .collect(),
            subject_id: s.subject_id,
        })
        .collect();

    Ok(ChecklistTemplateDto {
        id: t.id,
        institution_id: t.institution_id,
        period_id: t.period_id,
        teacher_id: t.teacher_id,
        name: t.name,
        created_at: t.created_at,
        subjects,
    })
}
