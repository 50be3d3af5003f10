use crate::error::ServiceResult;
use crate::ipc::error::respond;
use crate::ipc::params::{self, AREA_LEAD};
use crate::ipc::types::{AppState, Request};
use crate::service::directory::{self, DirectoryImport, ImportSummary};

fn import(state: &AppState, req: &Request) -> ServiceResult<ImportSummary> {
    let conn = params::conn(state)?;
    let principal = params::authorize(req, AREA_LEAD)?;
    let payload: DirectoryImport = params::parse(&req.params, "directory import")?;
    directory::import(conn, &principal.institution_id, &payload)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "directory.import" => Some(respond(&req.id, import(state, req))),
        _ => None,
    }
}
