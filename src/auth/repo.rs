use sqlx::{PgExecutor, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{Role, Session, User, UserStatus, VerificationCode};
use crate::oauth::provider::Provider;

const USER_COLUMNS: &str = "id, email, name, password_hash, avatar_url, role, status, \
     provider, provider_id, email_verified, created_at, last_login";

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by OAuth identity.
    pub async fn find_by_provider(
        db: &PgPool,
        provider: Provider,
        provider_id: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE provider = $1 AND provider_id = $2"
        ))
        .bind(provider)
        .bind(provider_id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Resolve the user owning an unexpired session token.
    pub async fn find_by_session_token(db: &PgPool, token: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.name, u.password_hash, u.avatar_url, u.role, u.status,
                   u.provider, u.provider_id, u.email_verified, u.created_at, u.last_login
            FROM users u
            INNER JOIN sessions s ON u.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > now()
            "#,
        )
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create an unverified local account.
    pub async fn create_local<'e, E: PgExecutor<'e>>(
        db: E,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, name, password_hash, role, email_verified) \
             VALUES ($1, $2, $3, 'user', FALSE) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Create a verified OAuth-linked account.
    pub async fn create_oauth<'e, E: PgExecutor<'e>>(
        db: E,
        email: &str,
        name: &str,
        provider: Provider,
        provider_id: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, name, provider, provider_id, email_verified, role) \
             VALUES ($1, $2, $3, $4, TRUE, 'user') \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(name)
        .bind(provider)
        .bind(provider_id)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Flip `email_verified` on and stamp `last_login`. Idempotent for
    /// already-verified accounts. Returns None when no user row exists.
    pub async fn mark_verified<'e, E: PgExecutor<'e>>(
        db: E,
        email: &str,
    ) -> anyhow::Result<Option<(Uuid, Role)>> {
        let row = sqlx::query_as::<_, (Uuid, Role)>(
            r#"
            UPDATE users SET email_verified = TRUE, last_login = now()
            WHERE email = $1
            RETURNING id, role
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn touch_last_login<'e, E: PgExecutor<'e>>(db: E, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET last_login = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// All users, newest first. Admin listing only.
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    pub async fn set_status<'e, E: PgExecutor<'e>>(
        db: E,
        id: Uuid,
        status: UserStatus,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

impl Session {
    pub async fn insert<'e, E: PgExecutor<'e>>(
        db: E,
        user_id: Uuid,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO sessions (user_id, token, expires_at) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(token)
            .bind(expires_at)
            .execute(db)
            .await?;
        Ok(())
    }
}

impl VerificationCode {
    pub async fn insert<'e, E: PgExecutor<'e>>(
        db: E,
        email: &str,
        code: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO email_verifications (email, code, expires_at) VALUES ($1, $2, $3)")
            .bind(email)
            .bind(code)
            .bind(expires_at)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Most recent code issued for an email. Superseded rows are ignored,
    /// never deleted.
    pub async fn latest_for_email(
        db: &PgPool,
        email: &str,
    ) -> anyhow::Result<Option<VerificationCode>> {
        let code = sqlx::query_as::<_, VerificationCode>(
            r#"
            SELECT email, code, expires_at, created_at
            FROM email_verifications
            WHERE email = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(code)
    }
}
