use crate::error::{ServiceError, ServiceResult};
use crate::model::StudentValuationDto;
use crate::service::populate;
use crate::store::valuations;
use rusqlite::Connection;

pub fn get(
    conn: &Connection,
    valuation_id: &str,
    institution_id: &str,
) -> ServiceResult<StudentValuationDto> {
    let v = valuations::find_by_id(conn, valuation_id, institution_id)?
        .ok_or_else(|| ServiceError::not_found("valuation"))?;
    populate::valuation_dto(conn, v)
}

pub fn list_by_student(
    conn: &Connection,
    student_id: &str,
    institution_id: &str,
) -> ServiceResult<Vec<StudentValuationDto>> {
    let vs = valuations::list_by_student(conn, student_id, institution_id)?;
    populate::valuation_dtos(conn, vs)
}

pub fn delete(conn: &Connection, valuation_id: &str, institution_id: &str) -> ServiceResult<()> {
    if valuations::delete(conn, valuation_id, institution_id)? == 0 {
        return Err(ServiceError::not_found("valuation"));
    }
    tracing::info!(valuation_id, "student valuation deleted");
    Ok(())
}
