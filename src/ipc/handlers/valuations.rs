use crate::error::ServiceResult;
use crate::ipc::error::respond;
use crate::ipc::params::{self, STAFF};
use crate::ipc::types::{AppState, Request};
use crate::model::{StudentValuationDto, ValuationUpdate};
use crate::service::initializer::{self, InitRequest};
use crate::service::{updater, valuations};

fn initialize(state: &AppState, req: &Request) -> ServiceResult<StudentValuationDto> {
    let conn = params::conn(state)?;
    let principal = params::authorize(req, STAFF)?;
    let student_id = params::uuid(req, "studentId")?;
    let period_id = params::uuid(req, "periodId")?;
    initializer::initialize(
        conn,
        InitRequest {
            student_id: &student_id,
            teacher_id: &principal.user_id,
            institution_id: &principal.institution_id,
            period_id: &period_id,
        },
    )
}

fn update(state: &AppState, req: &Request) -> ServiceResult<StudentValuationDto> {
    let conn = params::conn(state)?;
    let principal = params::authorize(req, STAFF)?;
    let valuation_id = params::uuid(req, "valuationId")?;
    let patch: ValuationUpdate = params::parse(&req.params, "valuation update")?;
    updater::update(conn, &valuation_id, &principal.institution_id, &patch)
}

fn get(state: &AppState, req: &Request) -> ServiceResult<StudentValuationDto> {
    let conn = params::conn(state)?;
    let principal = params::authorize(req, STAFF)?;
    let valuation_id = params::uuid(req, "valuationId")?;
    valuations::get(conn, &valuation_id, &principal.institution_id)
}

fn list_by_student(state: &AppState, req: &Request) -> ServiceResult<serde_json::Value> {
    let conn = params::conn(state)?;
    let principal = params::authorize(req, STAFF)?;
    let student_id = params::uuid(req, "studentId")?;
    let list = valuations::list_by_student(conn, &student_id, &principal.institution_id)?;
    Ok(serde_json::json!({ "valuations": list }))
}

fn delete(state: &AppState, req: &Request) -> ServiceResult<serde_json::Value> {
    let conn = params::conn(state)?;
    let principal = params::authorize(req, STAFF)?;
    let valuation_id = params::uuid(req, "valuationId")?;
    valuations::delete(conn, &valuation_id, &principal.institution_id)?;
    Ok(serde_json::json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "valuations.initialize" => respond(&req.id, initialize(state, req)),
        "valuations.update" => respond(&req.id, update(state, req)),
        "valuations.get" => respond(&req.id, get(state, req)),
        "valuations.listByStudent" => respond(&req.id, list_by_student(state, req)),
        "valuations.delete" => respond(&req.id, delete(state, req)),
        _ => return None,
    };
    Some(resp)
}
