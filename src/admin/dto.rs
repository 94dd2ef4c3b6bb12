use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{Role, User, UserStatus};
use crate::oauth::provider::Provider;

/// Moderation actions an admin can apply. The closed set makes the
/// action→status mapping total; anything else is rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Block,
    Unblock,
    Mute,
    Unmute,
}

impl AdminAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "block" => Some(AdminAction::Block),
            "unblock" => Some(AdminAction::Unblock),
            "mute" => Some(AdminAction::Mute),
            "unmute" => Some(AdminAction::Unmute),
            _ => None,
        }
    }

    pub fn target_status(self) -> UserStatus {
        match self {
            AdminAction::Block => UserStatus::Blocked,
            AdminAction::Unblock => UserStatus::Active,
            AdminAction::Mute => UserStatus::Muted,
            AdminAction::Unmute => UserStatus::Active,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            AdminAction::Block => "user blocked",
            AdminAction::Unblock => "user unblocked",
            AdminAction::Mute => "user muted",
            AdminAction::Unmute => "user unmuted",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    pub user_id: Option<Uuid>,
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SetStatusResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Fixed projection for the admin listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar: String,
    pub role: Role,
    pub status: UserStatus,
    pub provider: Option<Provider>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
}

impl From<User> for AdminUserRow {
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
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<AdminUserRow>,
    pub total: usize,
}
