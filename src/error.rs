use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Every failure a handler can return. Each variant maps to exactly one
/// status code; the first failure short-circuits the request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("recaptcha check failed")]
    BotSuspected,
    #[error("email already registered")]
    EmailTaken,
    #[error("verification code not found")]
    CodeNotFound,
    #[error("verification code expired")]
    CodeExpired,
    #[error("invalid verification code")]
    InvalidCode,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("unknown action")]
    UnknownAction,
    #[error("unknown provider")]
    UnknownProvider,
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::BotSuspected
            | ApiError::EmailTaken
            | ApiError::CodeNotFound
            | ApiError::CodeExpired
            | ApiError::InvalidCode
            | ApiError::UserNotFound
            | ApiError::UnknownAction
            | ApiError::UnknownProvider
            | ApiError::Upstream(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Internal(err) = &self {
            tracing::error!(error = %err, "internal error");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::BotSuspected.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::EmailTaken.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::CodeExpired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidCode.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::UnknownAction.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Upstream("boom".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Unauthorized("token not provided").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("account blocked").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_does_not_leak_details() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused to 10.0.0.1"));
        assert_eq!(err.to_string(), "internal error");
    }
}
