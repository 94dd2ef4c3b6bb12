use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{EmailAuthRequest, RegisterResponse, TokenResponse, UserInfoResponse},
        extractors::CurrentUser,
        password::{hash_password, verify_password},
        repo_types::{User, VerificationCode},
        services::{
            check_code, ensure_login_allowed, generate_code, is_valid_email, issue_session,
            CODE_TTL,
        },
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/email", post(email_auth))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

/// Single entry point for the local-auth flows; the body's `action`
/// field picks register, verify or login.
#[instrument(skip(state, payload))]
pub async fn email_auth(
    State(state): State<AppState>,
    Json(mut payload): Json<EmailAuthRequest>,
) -> Result<Response, ApiError> {
    let action = payload.action.take();
    match action.as_deref() {
        Some("register") => register(&state, payload).await.map(json_response),
        Some("verify") => verify(&state, payload).await.map(json_response),
        Some("login") => login(&state, payload).await.map(json_response),
        other => {
            warn!(action = ?other, "unknown auth action");
            Err(ApiError::UnknownAction)
        }
    }
}

fn json_response<T: serde::Serialize>(body: T) -> Response {
    Json(body).into_response()
}

fn require(field: Option<String>, message: &str) -> Result<String, ApiError> {
    match field {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::Validation(message.into())),
    }
}

async fn check_captcha(state: &AppState, token: Option<&str>) -> Result<(), ApiError> {
    let verdict = state.captcha.verify(token.unwrap_or("")).await?;
    if !verdict.is_human() {
        warn!(score = verdict.score, "recaptcha rejected request");
        return Err(ApiError::BotSuspected);
    }
    Ok(())
}

async fn register(
    state: &AppState,
    payload: EmailAuthRequest,
) -> Result<RegisterResponse, ApiError> {
    let email = require(payload.email, "email and password are required")?;
    let password = require(payload.password, "email and password are required")?;

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("invalid email".into()));
    }
    if password.len() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }

    check_captcha(state, payload.recaptcha_token.as_deref()).await?;

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::EmailTaken);
    }

    let name = payload
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or(email.as_str()).to_string());

    let code = generate_code();
    let hash = hash_password(&password)?;

    // Code and user land together or not at all.
    let mut tx = state.db.begin().await?;
    VerificationCode::insert(
        &mut *tx,
        &email,
        &code,
        OffsetDateTime::now_utc() + CODE_TTL,
    )
    .await?;
    let user = User::create_local(&mut *tx, &email, &name, &hash).await?;
    tx.commit().await?;

    // The rows above stay committed even if delivery fails; the code
    // simply expires unused and the caller sees a 500.
    if let Err(e) = state.mailer.send_verification_code(&email, &code).await {
        error!(error = %e, email = %email, "verification email delivery failed");
        return Err(ApiError::Internal(e));
    }

    info!(user_id = %user.id, email = %user.email, "user registered, code sent");
    Ok(RegisterResponse {
        success: true,
        message: "verification code sent",
        email,
    })
}

async fn verify(state: &AppState, payload: EmailAuthRequest) -> Result<TokenResponse, ApiError> {
    let email = require(payload.email, "email and code are required")?;
    let code = require(payload.code, "email and code are required")?;

    let stored = VerificationCode::latest_for_email(&state.db, &email)
        .await?
        .ok_or(ApiError::CodeNotFound)?;
    check_code(&stored, &code, OffsetDateTime::now_utc())?;

    let mut tx = state.db.begin().await?;
    let (user_id, _role) = User::mark_verified(&mut *tx, &email)
        .await?
        .ok_or(ApiError::UserNotFound)?;
    let token = issue_session(&mut *tx, user_id).await?;
    tx.commit().await?;

    info!(user_id = %user_id, email = %email, "email verified");
    Ok(TokenResponse {
        success: true,
        token,
    })
}

async fn login(state: &AppState, payload: EmailAuthRequest) -> Result<TokenResponse, ApiError> {
    let email = require(payload.email, "email and password are required")?;
    let password = require(payload.password, "email and password are required")?;

    check_captcha(state, payload.recaptcha_token.as_deref()).await?;

    // One response for unknown email, OAuth-only account and wrong
    // password: no oracle about which part failed.
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;
    let hash = user
        .password_hash
        .as_deref()
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(&password, hash)? {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    ensure_login_allowed(&user)?;

    let mut tx = state.db.begin().await?;
    User::touch_last_login(&mut *tx, user.id).await?;
    let token = issue_session(&mut *tx, user.id).await?;
    tx.commit().await?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(TokenResponse {
        success: true,
        token,
    })
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<UserInfoResponse> {
    Json(user.into())
}
