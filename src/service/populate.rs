use crate::error::{ServiceError, ServiceResult};
use crate::model::{
    LearningValuationDto, StudentName, StudentValuation, StudentValuationDto, SubjectValuationDto,
};
use crate::scoring;
use crate::store::directory::{self, UserRecord};
use crate::store::learnings;
use rusqlite::Connection;
use std::collections::HashMap;

pub const PERIOD_PLACEHOLDER: &str = "Periodo no disponible";
pub const SUBJECT_PLACEHOLDER: &str = "Asignatura no disponible";
pub const LEARNING_PLACEHOLDER: &str = "Aprendizaje eliminado";

/// Display data for every reference held by a batch of valuations.
struct Lookups {
    students: HashMap<String, UserRecord>,
    periods: HashMap<String, String>,
    subjects: HashMap<String, String>,
    learnings: HashMap<String, String>,
}

impl Lookups {
    fn load(conn: &Connection, valuations: &[StudentValuation]) -> ServiceResult<Self> {
        let student_ids: Vec<&str> = valuations.iter().map(|v| v.student_id.as_str()).collect();
        let period_ids: Vec<&str> = valuations.iter().map(|v| v.period_id.as_str()).collect();
        let subject_ids: Vec<&str> = valuations
            .iter()
            .flat_map(|v| v.valuations_by_subject.iter())
            .map(|s| s.subject_id.as_str())
            .collect();
        let learning_ids: Vec<&str> = valuations
            .iter()
            .flat_map(|v| v.valuations_by_subject.iter())
            .flat_map(|s| s.learning_valuations.iter())
            .map(|lv| lv.learning_id.as_str())
            .collect();

        Ok(Self {
            students: directory::find_users(conn, &student_ids)?,
            periods: directory::period_names(conn, &period_ids)?,
            subjects: directory::subject_names(conn, &subject_ids)?,
            learnings: learnings::descriptions(conn, &learning_ids)?,
        })
    }

    fn stitch(&self, v: StudentValuation) -> ServiceResult<StudentValuationDto> {
        let Some(student) = self.students.get(&v.student_id) else {
            tracing::error!(
                valuation_id = %v.id,
                student_id = %v.student_id,
                "valuation references a student that no longer exists"
            );
            return Err(ServiceError::Integrity(
                "the student associated with this valuation was not found".to_string(),
            ));
        };

        let period_name = self
            .periods
            .get(&v.period_id)
            .cloned()
            .unwrap_or_else(|| PERIOD_PLACEHOLDER.to_string());

        let valuations_by_subject = v
            .valuations_by_subject
            .into_iter()
            .map(|s| {
                let is_complete = scoring::subject_is_complete(&s);
                SubjectValuationDto {
                    subject_name: self
                        .subjects
                        .get(&s.subject_id)
                        .cloned()
                        .unwrap_or_else(|| SUBJECT_PLACEHOLDER.to_string()),
                    subject_id: s.subject_id,
                    total_subject_score: s.total_subject_score,
                    max_subject_score: s.max_subject_score,
                    subject_percentage: s.subject_percentage,
                    assigned_concept_id: s.assigned_concept_id,
                    is_complete,
                    learning_valuations: s
                        .learning_valuations
                        .into_iter()
                        .map(|lv| LearningValuationDto {
                            learning_description: self
                                .learnings
                                .get(&lv.learning_id)
                                .cloned()
                                .unwrap_or_else(|| LEARNING_PLACEHOLDER.to_string()),
                            learning_id: lv.learning_id,
                            qualitative_valuation: lv.qualitative_valuation,
                            points_obtained: lv.points_obtained,
                        })
                        .collect(),
                }
            })
            .collect();

        Ok(StudentValuationDto {
            id: v.id,
            institution_id: v.institution_id,
            student_id: v.student_id,
            student_name: StudentName {
                first_name: student.first_name.clone(),
                middle_name: student.middle_name.clone(),
                last_name: student.last_name.clone(),
                second_last_name: student.second_last_name.clone(),
            },
            teacher_id: v.teacher_id,
            checklist_template_id: v.checklist_template_id,
            period_id: v.period_id,
            period_name,
            global_status: v.global_status,
            valuations_by_subject,
            created_at: v.created_at,
            updated_at: v.updated_at,
        })
    }
}

pub fn valuation_dto(conn: &Connection, v: StudentValuation) -> ServiceResult<StudentValuationDto> {
    let lookups = Lookups::load(conn, std::slice::from_ref(&v))?;
    lookups.stitch(v)
}

pub fn valuation_dtos(
    conn: &Connection,
    vs: Vec<StudentValuation>,
) -> ServiceResult<Vec<StudentValuationDto>> {
    let lookups = Lookups::load(conn, &vs)?;
    vs.into_iter().map(|v| lookups.stitch(v)).collect()
}
