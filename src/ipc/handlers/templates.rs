use crate::error::ServiceResult;
use crate::ipc::error::respond;
use crate::ipc::params::{self, STAFF};
use crate::ipc::types::{AppState, Request};
use crate::model::ChecklistTemplateDto;
use crate::service::template::{self, NewTemplate};

fn create(state: &AppState, req: &Request) -> ServiceResult<ChecklistTemplateDto> {
    let conn = params::conn(state)?;
    let principal = params::authorize(req, STAFF)?;
    let input = NewTemplate {
        name: params::string(req, "name")?,
        period_id: params::uuid(req, "periodId")?,
    };
    template::create(conn, &principal, &input)
}

fn get(state: &AppState, req: &Request) -> ServiceResult<ChecklistTemplateDto> {
    let conn = params::conn(state)?;
    let principal = params::authorize(req, STAFF)?;
    let template_id = params::uuid(req, "templateId")?;
    template::get(conn, &template_id, &principal.institution_id)
}

fn list(state: &AppState, req: &Request) -> ServiceResult<serde_json::Value> {
    let conn = params::conn(state)?;
    let principal = params::authorize(req, STAFF)?;
    let templates =
        template::list_for_teacher(conn, &principal.user_id, &principal.institution_id)?;
    Ok(serde_json::json!({ "templates": templates }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "templates.create" => respond(&req.id, create(state, req)),
        "templates.get" => respond(&req.id, get(state, req)),
        "templates.list" => respond(&req.id, list(state, req)),
        _ => return None,
    };
    Some(resp)
}
