//! Error types for the gamification API layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Engine
//! errors map onto it with a fixed status taxonomy; database failures are
//! logged and surfaced as an opaque 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use questline_engine::EngineError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No usable identity on the request.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller's identity is valid but insufficient.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The requested resource was not found (or is not visible to the
    /// caller; the two are deliberately indistinguishable).
    #[error("not found: {0}")]
    NotFound(String),

    /// The request payload failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The request was well-formed but conflicts with current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An internal error occurred. The detail is logged, not returned.
    #[error("internal error")]
    Internal,
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound(msg) => Self::NotFound(msg),
            EngineError::PermissionDenied(msg) => Self::Forbidden(msg),
            EngineError::ValidationFailed(msg) => Self::Validation(msg),
            EngineError::PreconditionFailed(msg) => Self::Conflict(msg),
            EngineError::Db(e) => {
                tracing::error!(error = %e, "engine database failure");
                Self::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("internal error"),
            ),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questline_db::DbError;

    #[test]
    fn engine_errors_map_to_expected_statuses() {
        let cases = [
            (
                EngineError::NotFound(String::from("x")),
                StatusCode::NOT_FOUND,
            ),
            (
                EngineError::PermissionDenied(String::from("x")),
                StatusCode::FORBIDDEN,
            ),
            (
                EngineError::ValidationFailed(String::from("x")),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                EngineError::PreconditionFailed(String::from("x")),
                StatusCode::CONFLICT,
            ),
            (
                EngineError::Db(DbError::Decode(String::from("x"))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (engine_err, expected) in cases {
            let api_err = ApiError::from(engine_err);
            let response = api_err.into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn internal_error_hides_detail() {
        let err = ApiError::from(EngineError::Db(DbError::Decode(String::from(
            "secret detail",
        ))));
        assert_eq!(err.to_string(), "internal error");
    }
}
