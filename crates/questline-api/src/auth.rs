//! Identity extractors for the gamification API.
//!
//! Authentication happens upstream: a trusted proxy terminates the user
//! session and forwards identity as headers. The API only parses them:
//!
//! - `x-user-id` -- the caller's user ID (UUID)
//! - `x-user-role` -- `admin` for operator endpoints, anything else for
//!   regular learners
//!
//! [`AuthUser`] rejects requests without a parseable `x-user-id` (401).
//! [`AdminUser`] additionally requires the admin role (403).

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use questline_types::UserId;
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the caller's user ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the caller's role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Role value that unlocks admin endpoints.
const ADMIN_ROLE: &str = "admin";

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

/// An authenticated caller with the admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub UserId);

fn user_id_from_headers(headers: &HeaderMap) -> Result<UserId, ApiError> {
    let raw = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?;
    let uuid = raw
        .parse::<Uuid>()
        .map_err(|_| ApiError::Unauthorized(format!("invalid {USER_ID_HEADER} header")))?;
    Ok(UserId::from(uuid))
}

fn is_admin(headers: &HeaderMap) -> bool {
    headers
        .get(USER_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|role| role.eq_ignore_ascii_case(ADMIN_ROLE))
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_id_from_headers(&parts.headers).map(Self)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = user_id_from_headers(&parts.headers)?;
        if !is_admin(&parts.headers) {
            return Err(ApiError::Forbidden(String::from(
                "admin role required",
            )));
        }
        Ok(Self(user_id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(id: Option<&str>, role: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(id) = id {
            headers.insert(USER_ID_HEADER, HeaderValue::from_str(id).unwrap());
        }
        if let Some(role) = role {
            headers.insert(USER_ROLE_HEADER, HeaderValue::from_str(role).unwrap());
        }
        headers
    }

    #[test]
    fn valid_user_id_parses() {
        let id = Uuid::now_v7();
        let headers = headers_with(Some(&id.to_string()), None);
        let parsed = user_id_from_headers(&headers).unwrap();
        assert_eq!(parsed, UserId::from(id));
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let headers = headers_with(None, None);
        assert!(matches!(
            user_id_from_headers(&headers),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn garbage_header_is_unauthorized() {
        let headers = headers_with(Some("not-a-uuid"), None);
        assert!(matches!(
            user_id_from_headers(&headers),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn role_check_is_case_insensitive() {
        let headers = headers_with(None, Some("Admin"));
        assert!(is_admin(&headers));
        let headers = headers_with(None, Some("learner"));
        assert!(!is_admin(&headers));
    }
}
