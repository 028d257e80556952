// ================================================================
// File: fidelia-common/src/error.rs
// ================================================================

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found error: {0}")]
    NotFound(String),

    /// Create/update input rejected; lists every violated field at once.
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Benefit is not active")]
    NotActive,

    #[error("Benefit validity window has ended")]
    Expired,

    #[error("Benefit validity window has not started yet")]
    NotYetStarted,

    #[error("Benefit global quota is exhausted")]
    QuotaExhausted,

    #[error("Member has reached the per-member redemption limit")]
    PerMemberQuotaExceeded,

    #[error("Member {member_id} is not eligible for benefit {benefit_id}")]
    AccessDenied { benefit_id: Uuid, member_id: Uuid },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Uuid error: {0}")]
    Uuid(#[from] uuid::Error),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}

impl From<chrono::format::ParseError> for Error {
    fn from(err: chrono::format::ParseError) -> Self {
        Error::Parse(err.to_string())
    }
}

impl Error {
    /// True for the error kinds that abort a redemption attempt with a
    /// caller-actionable reason, as opposed to infrastructure failures.
    pub fn is_redemption_rejection(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_)
                | Error::NotActive
                | Error::Expired
                | Error::NotYetStarted
                | Error::QuotaExhausted
                | Error::PerMemberQuotaExceeded
                | Error::AccessDenied { .. }
        )
    }
}
