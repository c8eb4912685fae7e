//! Error types for the gamification engine.
//!
//! Engine errors carry the caller-facing taxonomy; the API layer maps
//! each variant to a status code. Data-layer failures are wrapped rather
//! than surfaced raw.

use questline_db::DbError;

/// Errors produced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The referenced entity does not exist (or is not visible to the
    /// caller -- the two are deliberately indistinguishable).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller is not allowed to perform this operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The request payload is structurally invalid.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The request is valid but the domain state forbids it.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// A data-layer operation failed.
    #[error("Data layer error: {0}")]
    Db(#[from] DbError),
}
