use crate::model::{GlobalStatus, QualitativeValuation, StudentValuation, SubjectValuation};

/// Highest mark a single learning can earn (`ACHIEVED`).
pub const MAX_POINTS_PER_LEARNING: i64 = 3;

pub fn points_for(v: Option<QualitativeValuation>) -> i64 {
    match v {
        Some(QualitativeValuation::Achieved) => 3,
        Some(QualitativeValuation::InProcess) => 2,
        Some(QualitativeValuation::WithDifficulty) => 1,
        None => 0,
    }
}

pub fn max_subject_score(learning_count: usize) -> i64 {
    learning_count as i64 * MAX_POINTS_PER_LEARNING
}

pub fn subject_percentage(total: i64, max: i64) -> f64 {
    if max > 0 {
        (total as f64 / max as f64) * 100.0
    } else {
        0.0
    }
}

pub fn subject_is_complete(subject: &SubjectValuation) -> bool {
    subject
        .learning_valuations
        .iter()
        .all(|lv| lv.qualitative_valuation.is_some())
}

/// True once every learning across every subject carries a mark.
pub fn valuation_is_complete(valuation: &StudentValuation) -> bool {
    valuation.valuations_by_subject.iter().all(subject_is_complete)
}

/// Recompute points, total and percentage for one subject.
pub fn score_subject(subject: &mut SubjectValuation) {
    let mut total = 0;
    for lv in subject.learning_valuations.iter_mut() {
        lv.points_obtained = points_for(lv.qualitative_valuation);
        total += lv.points_obtained;
    }
    subject.total_subject_score = total;
    subject.subject_percentage = subject_percentage(total, subject.max_subject_score);
}

/// Settle the global status after marks changed.
///
/// Scores are only (re)computed when the whole valuation is complete; an
/// incomplete valuation keeps whatever scores it had.
pub fn settle(valuation: &mut StudentValuation) -> GlobalStatus {
    if valuation_is_complete(valuation) {
        for subject in valuation.valuations_by_subject.iter_mut() {
            score_subject(subject);
        }
        valuation.global_status = GlobalStatus::Completed;
    } else {
        valuation.global_status = GlobalStatus::InProgress;
    }
    valuation.global_status
}
