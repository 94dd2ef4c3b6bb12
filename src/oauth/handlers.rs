use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        repo_types::{User, UserStatus},
        services::issue_session,
    },
    error::ApiError,
    oauth::{
        client::{exchange_code, fetch_profile},
        provider::Provider,
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct OAuthQuery {
    pub provider: Option<String>,
    pub code: Option<String>,
}

pub fn oauth_routes() -> Router<AppState> {
    Router::new().route("/auth/oauth", get(oauth))
}

/// Without a `code` this kicks off the provider redirect; with one it
/// completes the callback and redirects to the frontend with a token.
#[instrument(skip(state, query))]
pub async fn oauth(
    State(state): State<AppState>,
    Query(query): Query<OAuthQuery>,
) -> Result<Response, ApiError> {
    let provider = Provider::parse(query.provider.as_deref().unwrap_or("google")).ok_or_else(
        || {
            warn!(provider = ?query.provider, "unknown oauth provider");
            ApiError::UnknownProvider
        },
    )?;

    match query.code.as_deref() {
        None => {
            let url = provider.authorize_redirect(&state.config.oauth)?;
            Ok(found(&url))
        }
        Some(code) => callback(&state, provider, code).await,
    }
}

fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

async fn callback(state: &AppState, provider: Provider, code: &str) -> Result<Response, ApiError> {
    let access_token = exchange_code(&state.http, provider, &state.config.oauth, code).await?;
    let profile = fetch_profile(&state.http, provider, &access_token).await?;

    // User upsert and session land together, like the local-auth flows.
    let mut tx = state.db.begin().await?;
    let user = match User::find_by_provider(&state.db, provider, &profile.provider_id).await? {
        Some(user) => {
            if user.status == UserStatus::Blocked {
                return Err(ApiError::Forbidden("account blocked"));
            }
            User::touch_last_login(&mut *tx, user.id).await?;
            user
        }
        None => {
            User::create_oauth(
                &mut *tx,
                &profile.email,
                &profile.name,
                provider,
                &profile.provider_id,
            )
            .await?
        }
    };
    let token = issue_session(&mut *tx, user.id).await?;
    tx.commit().await?;
    info!(user_id = %user.id, provider = provider.as_str(), "oauth login");

    // Token travels as a query parameter, not a JSON body: the callback
    // lands in a browser, not in frontend code.
    Ok(found(&format!(
        "{}/?token={}",
        state.config.oauth.frontend_url, token
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_sets_location_and_302() {
        let response = found("https://front/?token=abc");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://front/?token=abc"
        );
    }

    #[test]
    fn query_deserializes_with_and_without_code() {
        let q: OAuthQuery = serde_json::from_str(r#"{"provider": "yandex"}"#).unwrap();
        assert_eq!(q.provider.as_deref(), Some("yandex"));
        assert!(q.code.is_none());

        let q: OAuthQuery =
            serde_json::from_str(r#"{"provider": "twitter", "code": "c0de"}"#).unwrap();
        assert_eq!(q.code.as_deref(), Some("c0de"));
    }
}
