use rusqlite::Connection;
use serde::de::DeserializeOwned;

use crate::error::{ServiceError, ServiceResult};
use crate::ipc::types::{AppState, Request};
use crate::model::{Principal, Role};

pub const STAFF: &[Role] = &[Role::AreaLead, Role::Teacher];
pub const AREA_LEAD: &[Role] = &[Role::AreaLead];
pub const ANY_ROLE: &[Role] = &[];

pub fn conn(state: &AppState) -> ServiceResult<&Connection> {
    state.db.as_ref().ok_or(ServiceError::NoWorkspace)
}

/// Resolve the caller and check their role. An empty `allowed` admits any role.
pub fn authorize(req: &Request, allowed: &[Role]) -> ServiceResult<Principal> {
    let Some(raw) = req.principal.as_ref() else {
        return Err(ServiceError::Unauthorized);
    };
    let principal: Principal =
        serde_json::from_value(raw.clone()).map_err(|_| ServiceError::Unauthorized)?;
    if principal.user_id.trim().is_empty() || principal.institution_id.trim().is_empty() {
        return Err(ServiceError::Unauthorized);
    }
    if !allowed.is_empty() && !allowed.contains(&principal.role) {
        return Err(ServiceError::Forbidden {
            role: principal.role.as_str(),
        });
    }
    Ok(principal)
}

pub fn opt_str<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

pub fn string(req: &Request, key: &str) -> ServiceResult<String> {
    opt_str(req, key)
        .map(str::to_string)
        .ok_or_else(|| ServiceError::validation(format!("missing params.{key}")))
}

pub fn check_uuid(key: &str, raw: &str) -> ServiceResult<String> {
    uuid::Uuid::parse_str(raw)
        .map(|_| raw.to_string())
        .map_err(|_| ServiceError::validation(format!("params.{key} must be a UUID")))
}

pub fn uuid(req: &Request, key: &str) -> ServiceResult<String> {
    let raw = string(req, key)?;
    check_uuid(key, &raw)
}

pub fn opt_uuid(req: &Request, key: &str) -> ServiceResult<Option<String>> {
    match req.params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(raw)) => check_uuid(key, raw).map(Some),
        Some(_) => Err(ServiceError::validation(format!(
            "params.{key} must be a string"
        ))),
    }
}

/// Deserialize a structured payload (the whole params object, or one field).
pub fn parse<T: DeserializeOwned>(value: &serde_json::Value, what: &str) -> ServiceResult<T> {
    serde_json::from_value(value.clone())
        .map_err(|e| ServiceError::validation(format!("invalid {what}: {e}")))
}
