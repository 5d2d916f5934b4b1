//! Bearer-token authentication for the REST API.
//!
//! Staff accounts carry an opaque bearer token issued when the
//! account is created. Handlers call [`authorize`] with the request
//! headers to resolve the acting user, then gate role-restricted
//! endpoints with [`require_role`]. Workflow writes are additionally
//! authorized inside the engine; the checks here only guard who may
//! reach an endpoint at all.

use axum::http::{header, HeaderMap};
use uuid::Uuid;

use hcms_core::domain::{Actor, Role, User};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Issues a fresh opaque bearer token: 64 hex characters.
pub fn issue_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Pulls the bearer token out of the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> ApiResult<&str> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;
    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header"))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Authorization header must use the Bearer scheme"))?
        .trim();
    if token.is_empty() {
        return Err(ApiError::unauthorized("Missing bearer token"));
    }
    Ok(token)
}

/// Resolves the request's bearer token to an active staff account.
pub async fn authorize(state: &AppState, headers: &HeaderMap) -> ApiResult<User> {
    let token = bearer_token(headers)?;
    state
        .store
        .user_by_token(token)
        .await
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))
}

/// Endpoint-level role gate.
pub fn require_role(user: &User, allowed: &[Role]) -> ApiResult<()> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "Role {} is not permitted to access this endpoint",
            user.role
        )))
    }
}

/// The identity an engine operation runs as.
pub fn actor(user: &User) -> Actor {
    user.actor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(value).expect("Header value should be valid"),
        );
        headers
    }

    #[test]
    fn issued_tokens_are_64_hex_characters() {
        let token = issue_token();
        assert_eq!(token.len(), 64);
        assert!(token.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(token, issue_token());
    }

    #[test]
    fn bearer_token_requires_the_bearer_scheme() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        let err = bearer_token(&headers).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn bearer_token_rejects_a_missing_header() {
        let err = bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn bearer_token_extracts_the_token() {
        let headers = headers_with("Bearer abc123");
        let token = bearer_token(&headers).expect("Token should parse");
        assert_eq!(token, "abc123");
    }

    #[test]
    fn role_gate_rejects_roles_outside_the_list() {
        let user = User::new(
            "lab.tech".to_string(),
            "Lab Tech".to_string(),
            Role::LabTech,
            issue_token(),
        );
        require_role(&user, &[Role::LabTech, Role::Admin]).expect("Lab tech should pass");
        let err = require_role(&user, &[Role::Pharmacy]).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::FORBIDDEN);
    }
}
