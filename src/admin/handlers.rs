use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    admin::dto::{
        AdminAction, AdminUserRow, SetStatusRequest, SetStatusResponse, UserListResponse,
    },
    auth::{extractors::AdminUser, repo_types::User},
    error::ApiError,
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/users", get(list_users).put(set_user_status))
}

#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<UserListResponse>, ApiError> {
    let users: Vec<AdminUserRow> = User::list_all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let total = users.len();
    Ok(Json(UserListResponse { users, total }))
}

#[instrument(skip_all)]
pub async fn set_user_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<SetStatusRequest>,
) -> Result<Json<SetStatusResponse>, ApiError> {
    let (user_id, action) = match (payload.user_id, payload.action.as_deref()) {
        (Some(user_id), Some(action)) if !action.is_empty() => (user_id, action),
        _ => {
            return Err(ApiError::Validation(
                "userId and action are required".into(),
            ))
        }
    };
    let action = AdminAction::parse(action).ok_or(ApiError::UnknownAction)?;

    User::set_status(&state.db, user_id, action.target_status()).await?;

    info!(
        admin_id = %admin.id,
        user_id = %user_id,
        action = ?action,
        "user status changed"
    );
    Ok(Json(SetStatusResponse {
        success: true,
        message: action.message(),
    }))
}
