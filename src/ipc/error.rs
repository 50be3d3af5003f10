use serde_json::json;

use crate::error::ServiceError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn service_err(id: &str, e: &ServiceError) -> serde_json::Value {
    match e {
        ServiceError::Integrity(_) | ServiceError::Db(_) => {
            tracing::error!(request_id = id, code = e.code(), error = %e, "request failed")
        }
        _ => tracing::warn!(request_id = id, code = e.code(), error = %e, "request rejected"),
    }
    err(id, e.code(), e.to_string(), Some(e.details()))
}

/// Serialize a service result into a response envelope.
pub fn respond<T: serde::Serialize>(
    id: &str,
    result: Result<T, ServiceError>,
) -> serde_json::Value {
    match result {
        Ok(v) => match serde_json::to_value(v) {
            Ok(value) => ok(id, value),
            Err(e) => err(id, "internal", format!("serialize failed: {e}"), None),
        },
        Err(e) => service_err(id, &e),
    }
}
