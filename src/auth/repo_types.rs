use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::oauth::provider::Provider;

/// Coarse permission tier. Admin is granted out-of-band, never by a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Account state, independent of role. Only `blocked` prevents login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Blocked,
    Muted,
}

/// User record in the database. Local accounts carry a password hash,
/// OAuth accounts a (provider, provider_id) pair.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub provider: Option<Provider>,
    pub provider_id: Option<String>,
    pub email_verified: bool,
    pub created_at: OffsetDateTime,
    pub last_login: Option<OffsetDateTime>,
}

/// Bearer session. Valid while `expires_at` is in the future; never revoked.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: OffsetDateTime,
}

/// Email confirmation code. Rows are never deleted; the latest row per
/// email is the only one consulted at verification time.
#[derive(Debug, Clone, FromRow)]
pub struct VerificationCode {
    pub email: String,
    pub code: String,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_and_status_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&UserStatus::Blocked).unwrap(),
            "\"blocked\""
        );
        assert_eq!(
            serde_json::from_str::<UserStatus>("\"muted\"").unwrap(),
            UserStatus::Muted
        );
    }
}
