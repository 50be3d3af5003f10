use crate::error::ServiceResult;
use crate::ipc::error::respond;
use crate::ipc::params::{self, ANY_ROLE, AREA_LEAD};
use crate::ipc::types::{AppState, Request};
use crate::model::ExpectedLearning;
use crate::service::learnings::{self, LearningPatch, NewLearning};
use crate::store::learnings::LearningFilter;

fn create(state: &AppState, req: &Request) -> ServiceResult<ExpectedLearning> {
    let conn = params::conn(state)?;
    let principal = params::authorize(req, AREA_LEAD)?;
    params::uuid(req, "subjectId")?;
    params::uuid(req, "periodId")?;
    let input: NewLearning = params::parse(&req.params, "learning")?;
    learnings::create(conn, &principal, &input)
}

fn list(state: &AppState, req: &Request) -> ServiceResult<serde_json::Value> {
    let conn = params::conn(state)?;
    let principal = params::authorize(req, ANY_ROLE)?;
    let filter = LearningFilter {
        period_id: params::opt_uuid(req, "periodId")?,
        subject_id: params::opt_uuid(req, "subjectId")?,
    };
    let rows = learnings::list(conn, &principal.institution_id, &filter)?;
    Ok(serde_json::json!({ "learnings": rows }))
}

fn update(state: &AppState, req: &Request) -> ServiceResult<ExpectedLearning> {
    let conn = params::conn(state)?;
    let principal = params::authorize(req, AREA_LEAD)?;
    let learning_id = params::uuid(req, "learningId")?;
    let raw = req.params.get("patch").cloned().unwrap_or_default();
    let patch: LearningPatch = if raw.is_null() {
        LearningPatch::default()
    } else {
        params::parse(&raw, "patch")?
    };
    if let Some(s) = patch.subject_id.as_deref() {
        params::check_uuid("patch.subjectId", s)?;
    }
    if let Some(p) = patch.period_id.as_deref() {
        params::check_uuid("patch.periodId", p)?;
    }
    learnings::update(conn, &learning_id, &principal.institution_id, &patch)
}

fn delete(state: &AppState, req: &Request) -> ServiceResult<serde_json::Value> {
    let conn = params::conn(state)?;
    let principal = params::authorize(req, AREA_LEAD)?;
    let learning_id = params::uuid(req, "learningId")?;
    learnings::delete(conn, &learning_id, &principal.institution_id)?;
    Ok(serde_json::json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "learnings.create" => respond(&req.id, create(state, req)),
        "learnings.list" => respond(&req.id, list(state, req)),
        "learnings.update" => respond(&req.id, update(state, req)),
        "learnings.delete" => respond(&req.id, delete(state, req)),
        _ => return None,
    };
    Some(resp)
}
