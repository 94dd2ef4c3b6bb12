use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RecaptchaConfig {
    pub secret_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    pub google: ProviderCredentials,
    pub yandex: ProviderCredentials,
    pub twitter: ProviderCredentials,
    /// Base URL the providers redirect back to; `?provider=<name>` is appended.
    pub redirect_base: String,
    /// Frontend origin that receives `?token=...` after a successful callback.
    pub frontend_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub recaptcha: RecaptchaConfig,
    pub smtp: SmtpConfig,
    pub oauth: OAuthConfig,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let recaptcha = RecaptchaConfig {
            secret_key: env_or("RECAPTCHA_SECRET_KEY", ""),
        };
        let smtp = SmtpConfig {
            host: env_or("SMTP_HOST", "localhost"),
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(587),
            user: env_or("SMTP_USER", ""),
            password: env_or("SMTP_PASSWORD", ""),
            from: env_or("SMTP_FROM", "no-reply@pozlite.studio"),
        };
        let oauth = OAuthConfig {
            google: ProviderCredentials {
                client_id: env_or("GOOGLE_CLIENT_ID", ""),
                client_secret: env_or("GOOGLE_CLIENT_SECRET", ""),
            },
            yandex: ProviderCredentials {
                client_id: env_or("YANDEX_CLIENT_ID", ""),
                client_secret: env_or("YANDEX_CLIENT_SECRET", ""),
            },
            twitter: ProviderCredentials {
                client_id: env_or("TWITTER_API_KEY", ""),
                client_secret: env_or("TWITTER_API_SECRET", ""),
            },
            redirect_base: env_or("OAUTH_REDIRECT_BASE", "http://localhost:8080/auth/oauth"),
            frontend_url: env_or("FRONTEND_URL", "http://localhost:5173"),
        };
        Ok(Self {
            database_url,
            recaptcha,
            smtp,
            oauth,
        })
    }
}
