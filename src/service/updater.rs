use crate::error::{ServiceError, ServiceResult};
use crate::model::{QualitativeValuation, StudentValuation, StudentValuationDto, ValuationUpdate};
use crate::scoring;
use crate::service::populate;
use crate::store::{self, valuations};
use rusqlite::Connection;
use std::collections::HashMap;

/// Overwrite the marks named in `update`. Learnings not mentioned keep their
/// value; subject or learning ids the valuation does not hold are ignored.
/// Returns how many learnings were touched.
pub fn apply_marks(valuation: &mut StudentValuation, update: &ValuationUpdate) -> usize {
    let mut by_subject: HashMap<&str, HashMap<&str, Option<QualitativeValuation>>> = HashMap::new();
    for s in &update.valuations_by_subject {
        let marks = by_subject.entry(s.subject_id.as_str()).or_default();
        for lv in &s.learning_valuations {
            marks.insert(lv.learning_id.as_str(), lv.qualitative_valuation);
        }
    }

    let mut touched = 0;
    for subject in valuation.valuations_by_subject.iter_mut() {
        let Some(marks) = by_subject.get(subject.subject_id.as_str()) else {
            continue;
        };
        for lv in subject.learning_valuations.iter_mut() {
            if let Some(mark) = marks.get(lv.learning_id.as_str()) {
                lv.qualitative_valuation = *mark;
                touched += 1;
            }
        }
    }
    touched
}

pub fn update(
    conn: &Connection,
    valuation_id: &str,
    institution_id: &str,
    update: &ValuationUpdate,
) -> ServiceResult<StudentValuationDto> {
    let mut valuation = valuations::find_by_id(conn, valuation_id, institution_id)?
        .ok_or_else(|| ServiceError::not_found("valuation"))?;

    let before = valuation.global_status;
    let touched = apply_marks(&mut valuation, update);
    let status = scoring::settle(&mut valuation);
    valuation.updated_at = store::now_rfc3339();

    if valuations::save(conn, &valuation)? == 0 {
        // Deleted between the read and the write.
        return Err(ServiceError::not_found("valuation"));
    }
    tracing::info!(
        valuation_id = %valuation.id,
        touched,
        from = before.as_str(),
        to = status.as_str(),
        "student valuation updated"
    );
    populate::valuation_dto(conn, valuation)
}
