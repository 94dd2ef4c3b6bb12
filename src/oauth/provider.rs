use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::{OAuthConfig, ProviderCredentials};

/// Supported OAuth providers. Each variant carries its endpoints, header
/// scheme and profile field mapping, so adding a provider means adding a
/// variant and its match arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "auth_provider", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Yandex,
    Twitter,
}

/// Normalized profile shared by all providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProfile {
    pub provider_id: String,
    pub email: String,
    pub name: String,
}

impl Provider {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "google" => Some(Provider::Google),
            "yandex" => Some(Provider::Yandex),
            "twitter" => Some(Provider::Twitter),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Yandex => "yandex",
            Provider::Twitter => "twitter",
        }
    }

    pub fn auth_url(self) -> &'static str {
        match self {
            Provider::Google => "https://accounts.google.com/o/oauth2/v2/auth",
            Provider::Yandex => "https://oauth.yandex.ru/authorize",
            Provider::Twitter => "https://twitter.com/i/oauth2/authorize",
        }
    }

    pub fn token_url(self) -> &'static str {
        match self {
            Provider::Google => "https://oauth2.googleapis.com/token",
            Provider::Yandex => "https://oauth.yandex.ru/token",
            Provider::Twitter => "https://api.twitter.com/2/oauth2/token",
        }
    }

    pub fn user_info_url(self) -> &'static str {
        match self {
            Provider::Google => "https://www.googleapis.com/oauth2/v2/userinfo",
            Provider::Yandex => "https://login.yandex.ru/info",
            Provider::Twitter => "https://api.twitter.com/2/users/me",
        }
    }

    pub fn scope(self) -> &'static str {
        match self {
            Provider::Google => "openid email profile",
            Provider::Yandex => "",
            Provider::Twitter => "tweet.read users.read",
        }
    }

    /// Yandex expects `OAuth <token>` on the user-info call, everyone
    /// else plain `Bearer`.
    pub fn auth_scheme(self) -> &'static str {
        match self {
            Provider::Yandex => "OAuth",
            _ => "Bearer",
        }
    }

    pub fn credentials(self, config: &OAuthConfig) -> &ProviderCredentials {
        match self {
            Provider::Google => &config.google,
            Provider::Yandex => &config.yandex,
            Provider::Twitter => &config.twitter,
        }
    }

    pub fn redirect_uri(self, config: &OAuthConfig) -> String {
        format!("{}?provider={}", config.redirect_base, self.as_str())
    }

    /// Full authorization URL the browser is sent to when no code is
    /// present yet.
    pub fn authorize_redirect(self, config: &OAuthConfig) -> anyhow::Result<String> {
        let mut url = Url::parse(self.auth_url())?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &self.credentials(config).client_id);
            query.append_pair("redirect_uri", &self.redirect_uri(config));
            query.append_pair("response_type", "code");
            if !self.scope().is_empty() {
                query.append_pair("scope", self.scope());
            }
            if self == Provider::Google {
                query.append_pair("access_type", "offline");
            }
        }
        Ok(url.into())
    }

    /// Map a raw user-info response to the common profile shape. Twitter
    /// wraps its payload in a `data` envelope; the others are flat.
    pub fn normalize_profile(self, raw: Value) -> OAuthProfile {
        let info = match self {
            Provider::Twitter => raw.get("data").cloned().unwrap_or(Value::Null),
            _ => raw,
        };

        let provider_id = field_as_string(&info, "id")
            .or_else(|| field_as_string(&info, "sub"))
            .unwrap_or_default();
        let email = field_as_string(&info, "email")
            .or_else(|| field_as_string(&info, "default_email"))
            .unwrap_or_else(|| format!("{}@{}.user", provider_id, self.as_str()));
        let name = field_as_string(&info, "name")
            .or_else(|| field_as_string(&info, "display_name"))
            .or_else(|| field_as_string(&info, "username"))
            .unwrap_or_else(|| "User".into());

        OAuthProfile {
            provider_id,
            email,
            name,
        }
    }
}

/// Providers disagree on whether ids are strings or numbers.
fn field_as_string(info: &Value, field: &str) -> Option<String> {
    match info.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config() -> OAuthConfig {
        OAuthConfig {
            google: ProviderCredentials {
                client_id: "google-id".into(),
                client_secret: "google-secret".into(),
            },
            yandex: ProviderCredentials {
                client_id: "yandex-id".into(),
                client_secret: "yandex-secret".into(),
            },
            twitter: ProviderCredentials {
                client_id: "twitter-id".into(),
                client_secret: "twitter-secret".into(),
            },
            redirect_base: "https://api.test/auth/oauth".into(),
            frontend_url: "https://test".into(),
        }
    }

    #[test]
    fn parse_accepts_known_providers_only() {
        assert_eq!(Provider::parse("google"), Some(Provider::Google));
        assert_eq!(Provider::parse("yandex"), Some(Provider::Yandex));
        assert_eq!(Provider::parse("twitter"), Some(Provider::Twitter));
        assert_eq!(Provider::parse("github"), None);
        assert_eq!(Provider::parse("Google"), None);
    }

    #[test]
    fn yandex_uses_the_oauth_header_scheme() {
        assert_eq!(Provider::Yandex.auth_scheme(), "OAuth");
        assert_eq!(Provider::Google.auth_scheme(), "Bearer");
        assert_eq!(Provider::Twitter.auth_scheme(), "Bearer");
    }

    #[test]
    fn google_authorize_url_carries_scope_and_offline_access() {
        let url = Provider::Google.authorize_redirect(&test_config()).unwrap();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=google-id"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid+email+profile"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("provider%3Dgoogle"));
    }

    #[test]
    fn yandex_authorize_url_has_no_scope() {
        let url = Provider::Yandex.authorize_redirect(&test_config()).unwrap();
        assert!(!url.contains("scope="));
        assert!(!url.contains("access_type"));
    }

    #[test]
    fn google_profile_maps_flat_fields() {
        let profile = Provider::Google.normalize_profile(json!({
            "id": "g-123",
            "email": "g@example.com",
            "name": "G User",
        }));
        assert_eq!(
            profile,
            OAuthProfile {
                provider_id: "g-123".into(),
                email: "g@example.com".into(),
                name: "G User".into(),
            }
        );
    }

    #[test]
    fn yandex_profile_falls_back_to_default_email_and_display_name() {
        let profile = Provider::Yandex.normalize_profile(json!({
            "id": "42",
            "default_email": "y@example.com",
            "display_name": "Yan",
        }));
        assert_eq!(profile.email, "y@example.com");
        assert_eq!(profile.name, "Yan");
    }

    #[test]
    fn twitter_profile_is_read_from_the_data_envelope() {
        let profile = Provider::Twitter.normalize_profile(json!({
            "id": "top-level-ignored",
            "data": {
                "id": "tw-7",
                "username": "bird",
            }
        }));
        assert_eq!(profile.provider_id, "tw-7");
        assert_eq!(profile.name, "bird");
    }

    #[test]
    fn missing_email_synthesizes_a_provider_address() {
        let profile = Provider::Twitter.normalize_profile(json!({
            "data": { "id": "tw-7", "username": "bird" }
        }));
        assert_eq!(profile.email, "tw-7@twitter.user");

        let profile = Provider::Google.normalize_profile(json!({ "sub": 12345 }));
        assert_eq!(profile.provider_id, "12345");
        assert_eq!(profile.email, "12345@google.user");
    }

    #[test]
    fn missing_name_falls_back_to_a_placeholder() {
        let profile = Provider::Google.normalize_profile(json!({ "id": "x" }));
        assert_eq!(profile.name, "User");
    }

    #[test]
    fn numeric_ids_are_stringified() {
        let profile = Provider::Yandex.normalize_profile(json!({ "id": 987654 }));
        assert_eq!(profile.provider_id, "987654");
    }

    #[test]
    fn provider_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Provider::Twitter).unwrap(),
            "\"twitter\""
        );
    }
}
