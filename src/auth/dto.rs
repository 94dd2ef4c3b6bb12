use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{Role, User, UserStatus};
use crate::oauth::provider::Provider;

/// Body of `POST /auth/email`. Every field is optional so that missing
/// input surfaces as a 400 with a useful message instead of a rejected
/// deserialization; the `action` field selects the flow.
#[derive(Debug, Deserialize)]
pub struct EmailAuthRequest {
    pub action: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "recaptchaToken")]
    pub recaptcha_token: Option<String>,
}

/// Response to a successful registration: the account is pending
/// verification, no token yet.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: &'static str,
    pub email: String,
}

/// Response carrying a fresh session token (verify and login).
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}

/// Public projection of a user, returned by `GET /me`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar: String,
    pub role: Role,
    pub status: UserStatus,
    pub provider: Option<Provider>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserInfoResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            avatar: user.avatar_url.unwrap_or_default(),
            role: user.role,
            status: user.status,
            provider: user.provider,
            created_at: user.created_at,
        }
    }
}
