use base64ct::{Base64UrlUnpadded, Encoding};
use lazy_static::lazy_static;
use rand::{rngs::OsRng, Rng, RngCore};
use regex::Regex;
use sqlx::PgExecutor;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::auth::repo_types::{Session, User, UserStatus, VerificationCode};
use crate::error::ApiError;

/// How long an email verification code stays usable.
pub const CODE_TTL: Duration = Duration::minutes(5);
/// How long an issued session token stays valid.
pub const SESSION_TTL: Duration = Duration::days(30);

const CODE_LEN: usize = 6;
const TOKEN_BYTES: usize = 32;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// 6-digit numeric confirmation code.
pub fn generate_code() -> String {
    let mut rng = OsRng;
    (0..CODE_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Unguessable URL-safe session token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

/// Validate a submitted code against the latest stored one. Expiry is
/// checked before the code itself, matching the verification order of
/// the email flow.
pub fn check_code(
    stored: &VerificationCode,
    submitted: &str,
    now: OffsetDateTime,
) -> Result<(), ApiError> {
    if now > stored.expires_at {
        return Err(ApiError::CodeExpired);
    }
    if submitted != stored.code {
        return Err(ApiError::InvalidCode);
    }
    Ok(())
}

/// Gate applied after the credential check: blocked accounts and
/// unverified emails cannot log in. Muted accounts can.
pub fn ensure_login_allowed(user: &User) -> Result<(), ApiError> {
    if user.status == UserStatus::Blocked {
        return Err(ApiError::Forbidden("account blocked"));
    }
    if !user.email_verified {
        return Err(ApiError::Forbidden("email not verified"));
    }
    Ok(())
}

/// Create a session row and hand back its bearer token.
pub async fn issue_session<'e, E: PgExecutor<'e>>(db: E, user_id: Uuid) -> anyhow::Result<String> {
    let token = generate_token();
    let expires_at = OffsetDateTime::now_utc() + SESSION_TTL;
    Session::insert(db, user_id, &token, expires_at).await?;
    Ok(token)
}
