use crate::error::ServiceResult;
use crate::ipc::error::respond;
use crate::ipc::params::{self, ANY_ROLE};
use crate::ipc::types::{AppState, Request};
use crate::service::session::{self, SessionSnapshot};

fn get(state: &AppState, req: &Request) -> ServiceResult<SessionSnapshot> {
    let conn = params::conn(state)?;
    let principal = params::authorize(req, ANY_ROLE)?;
    session::snapshot(conn, &principal)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.get" => Some(respond(&req.id, get(state, req))),
        _ => None,
    }
}
