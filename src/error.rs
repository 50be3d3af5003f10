use serde_json::json;

/// Errors raised by the valuation service and its collaborators.
///
/// Degraded references (a deleted period, subject or learning) are not errors;
/// they surface as placeholder text in the DTO instead.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("no expected learnings found for period {period_id}; cannot create an empty template")]
    EmptyPeriod { period_id: String },

    #[error("no checklist template exists for this period; create one first")]
    TemplateMissing { period_id: String },

    #[error("data integrity error: {0}")]
    Integrity(String),

    #[error("{0}")]
    Validation(String),

    #[error("a valuation for this student and period already exists outside this institution")]
    Conflict,

    #[error("{entity} {id} belongs to another institution")]
    ForeignId { entity: &'static str, id: String },

    #[error("missing principal")]
    Unauthorized,

    #[error("role {role} may not call this method")]
    Forbidden { role: &'static str },

    #[error("select a workspace first")]
    NoWorkspace,

    #[error(transparent)]
    Db(#[from] rusqlite::Error),
}

impl ServiceError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::EmptyPeriod { .. } => "empty_period",
            Self::TemplateMissing { .. } => "template_missing",
            Self::Integrity(_) => "integrity_error",
            Self::Validation(_) => "bad_params",
            Self::Conflict | Self::ForeignId { .. } => "conflict",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::NoWorkspace => "no_workspace",
            Self::Db(_) => "db_error",
        }
    }

    /// Status the REST surface answers with for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound { .. } | Self::TemplateMissing { .. } => 404,
            Self::EmptyPeriod { .. } | Self::Validation(_) => 400,
            Self::Conflict | Self::ForeignId { .. } | Self::NoWorkspace => 409,
            Self::Unauthorized => 401,
            Self::Forbidden { .. } => 403,
            Self::Integrity(_) | Self::Db(_) => 500,
        }
    }

    pub fn details(&self) -> serde_json::Value {
        let mut details = json!({ "status": self.http_status() });
        match self {
            Self::NotFound { entity } => details["entity"] = json!(entity),
            Self::ForeignId { entity, id } => {
                details["entity"] = json!(entity);
                details["id"] = json!(id);
            }
            Self::EmptyPeriod { period_id } | Self::TemplateMissing { period_id } => {
                details["periodId"] = json!(period_id)
            }
            _ => {}
        }
        details
    }

    pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
