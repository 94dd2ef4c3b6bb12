use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Minimum v3 risk score a request must reach to be treated as human.
pub const MIN_SCORE: f64 = 0.5;

#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaVerdict {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub score: f64,
}

impl CaptchaVerdict {
    pub fn is_human(&self) -> bool {
        self.success && self.score >= MIN_SCORE
    }
}

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> anyhow::Result<CaptchaVerdict>;
}

/// Google reCAPTCHA v3 siteverify client.
pub struct ReCaptcha {
    secret_key: String,
    http: reqwest::Client,
}

impl ReCaptcha {
    pub fn new(secret_key: String, http: reqwest::Client) -> Self {
        Self { secret_key, http }
    }
}

#[async_trait]
impl CaptchaVerifier for ReCaptcha {
    async fn verify(&self, token: &str) -> anyhow::Result<CaptchaVerdict> {
        let verdict: CaptchaVerdict = self
            .http
            .post(SITEVERIFY_URL)
            .form(&[
                ("secret", self.secret_key.as_str()),
                ("response", token),
            ])
            .send()
            .await?
            .json()
            .await?;
        debug!(success = verdict.success, score = verdict.score, "recaptcha verdict");
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_needs_success_and_score() {
        let verdict = CaptchaVerdict {
            success: true,
            score: 0.9,
        };
        assert!(verdict.is_human());
    }

    #[test]
    fn boundary_score_is_accepted() {
        let verdict = CaptchaVerdict {
            success: true,
            score: MIN_SCORE,
        };
        assert!(verdict.is_human());
    }

    #[test]
    fn low_score_is_rejected_even_on_success() {
        let verdict = CaptchaVerdict {
            success: true,
            score: 0.3,
        };
        assert!(!verdict.is_human());
    }

    #[test]
    fn failed_check_is_rejected_regardless_of_score() {
        let verdict = CaptchaVerdict {
            success: false,
            score: 0.9,
        };
        assert!(!verdict.is_human());
    }

    #[test]
    fn missing_fields_default_to_bot() {
        // v2 responses carry no score at all
        let verdict: CaptchaVerdict = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(!verdict.is_human());

        let verdict: CaptchaVerdict = serde_json::from_str("{}").unwrap();
        assert!(!verdict.is_human());
    }
}
