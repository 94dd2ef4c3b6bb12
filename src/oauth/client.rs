use serde_json::Value;
use tracing::error;

use crate::config::OAuthConfig;
use crate::error::ApiError;
use crate::oauth::provider::{OAuthProfile, Provider};

/// Trade an authorization code for the provider's access token.
pub async fn exchange_code(
    http: &reqwest::Client,
    provider: Provider,
    config: &OAuthConfig,
    code: &str,
) -> Result<String, ApiError> {
    let credentials = provider.credentials(config);
    let redirect_uri = provider.redirect_uri(config);

    let response = http
        .post(provider.token_url())
        .form(&[
            ("code", code),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    if !response.status().is_success() {
        let details = response.text().await.unwrap_or_default();
        error!(provider = provider.as_str(), details = %details, "token exchange failed");
        return Err(ApiError::Upstream(format!(
            "token exchange failed: {details}"
        )));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;
    body["access_token"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ApiError::Upstream("no access_token in provider response".into()))
}

/// Fetch the user profile with the provider's header scheme and normalize it.
pub async fn fetch_profile(
    http: &reqwest::Client,
    provider: Provider,
    access_token: &str,
) -> Result<OAuthProfile, ApiError> {
    let response = http
        .get(provider.user_info_url())
        .header(
            "Authorization",
            format!("{} {}", provider.auth_scheme(), access_token),
        )
        .send()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    if !response.status().is_success() {
        error!(provider = provider.as_str(), status = %response.status(), "user info fetch failed");
        return Err(ApiError::Upstream("failed to fetch user profile".into()));
    }

    let raw: Value = response
        .json()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;
    Ok(provider.normalize_profile(raw))
}
