use crate::error::{ServiceError, ServiceResult};
use crate::model::{
    ChecklistTemplate, GlobalStatus, LearningValuation, StudentValuation, StudentValuationDto,
    SubjectValuation,
};
use crate::scoring;
use crate::service::populate;
use crate::store::{self, directory, templates, valuations};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
pub struct InitRequest<'a> {
    pub student_id: &'a str,
    pub teacher_id: &'a str,
    pub institution_id: &'a str,
    pub period_id: &'a str,
}

/// Return the student's valuation for the period, creating it from the
/// teacher's checklist template on first access.
///
/// Safe to call repeatedly. The existence check and the insert are not one
/// atomic step; a concurrent insert for the same (student, period) is caught
/// by the UNIQUE constraint and resolved by re-reading the winner.
pub fn initialize(conn: &Connection, req: InitRequest<'_>) -> ServiceResult<StudentValuationDto> {
    if let Some(existing) =
        valuations::find_by_student_period(conn, req.student_id, req.period_id, req.institution_id)?
    {
        return populate::valuation_dto(conn, existing);
    }

    if !directory::period_exists(conn, req.period_id, req.institution_id)? {
        return Err(ServiceError::not_found("period"));
    }
    if directory::find_user_in_institution(conn, req.student_id, req.institution_id)?.is_none() {
        return Err(ServiceError::not_found("student"));
    }

    let template = templates::find_for_teacher_period(
        conn,
        req.teacher_id,
        req.period_id,
        req.institution_id,
    )?
    .ok_or_else(|| ServiceError::TemplateMissing {
        period_id: req.period_id.to_string(),
    })?;

    let fresh = seed_from_template(&template, req.student_id, &store::now_rfc3339());
    let valuation = insert_or_fetch_existing(conn, fresh)?;
    populate::valuation_dto(conn, valuation)
}

/// A new, unmarked valuation shaped after the template.
pub fn seed_from_template(
    template: &ChecklistTemplate,
    student_id: &str,
    now: &str,
) -> StudentValuation {
    let valuations_by_subject = template
        .subjects
        .iter()
        .map(|group| SubjectValuation {
            subject_id: group.subject_id.clone(),
            max_subject_score: scoring::max_subject_score(group.learnings.len()),
            total_subject_score: 0,
            subject_percentage: 0.0,
            assigned_concept_id: None,
            learning_valuations: group
                .learnings
                .iter()
                .map(|learning_id| LearningValuation {
                    learning_id: learning_id.clone(),
                    qualitative_valuation: None,
                    points_obtained: 0,
                })
                .collect(),
        })
        .collect();

    StudentValuation {
        id: store::new_id(),
        institution_id: template.institution_id.clone(),
        student_id: student_id.to_string(),
        teacher_id: template.teacher_id.clone(),
        checklist_template_id: template.id.clone(),
        period_id: template.period_id.clone(),
        global_status: GlobalStatus::NotStarted,
        valuations_by_subject,
        created_at: now.to_string(),
        updated_at: now.to_string(),
    }
}

/// Persist `fresh`, or return the valuation that beat it to the insert.
pub(crate) fn insert_or_fetch_existing(
    conn: &Connection,
    fresh: StudentValuation,
) -> ServiceResult<StudentValuation> {
    match valuations::insert(conn, &fresh) {
        Ok(()) => {
            tracing::info!(
                valuation_id = %fresh.id,
                student_id = %fresh.student_id,
                period_id = %fresh.period_id,
                "student valuation initialized"
            );
            Ok(fresh)
        }
        Err(e) if ServiceError::is_unique_violation(&e) => {
            tracing::debug!(
                student_id = %fresh.student_id,
                period_id = %fresh.period_id,
                "valuation insert lost a race; reading existing row"
            );
            valuations::find_by_student_period(
                conn,
                &fresh.student_id,
                &fresh.period_id,
                &fresh.institution_id,
            )?
            .ok_or(ServiceError::Conflict)
        }
        Err(e) => Err(e.into()),
    }
}
