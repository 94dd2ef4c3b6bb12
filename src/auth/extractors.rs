use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use tracing::warn;

use crate::auth::repo_types::{Role, User};
use crate::error::ApiError;
use crate::state::AppState;

/// Sessions travel in a custom header, not the standard Authorization scheme.
pub const AUTH_HEADER: &str = "X-Auth-Token";

pub(crate) fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTH_HEADER).and_then(|v| v.to_str().ok())
}

/// Resolves the `X-Auth-Token` header to the owning user via an unexpired
/// session. Missing, unknown and expired tokens are all a plain 401.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers)
            .ok_or(ApiError::Unauthorized("token not provided"))?;

        let user = User::find_by_session_token(&state.db, token)
            .await?
            .ok_or_else(|| {
                warn!("invalid or expired session token");
                ApiError::Unauthorized("invalid or expired token")
            })?;

        Ok(CurrentUser(user))
    }
}

/// Same resolution as [`CurrentUser`] plus a role check. Non-admins get 403.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            warn!(user_id = %user.id, "admin endpoint called by non-admin");
            return Err(ApiError::Forbidden("access denied"));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn token_is_read_from_the_custom_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-auth-token", HeaderValue::from_static("abc123"));
        assert_eq!(token_from_headers(&headers), Some("abc123"));
    }

    #[test]
    fn missing_header_yields_none() {
        let headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers), None);
    }

    #[test]
    fn authorization_header_is_not_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));
        assert_eq!(token_from_headers(&headers), None);
    }
}
