//! Accounts and sessions: email rules, password hashing, and the cookie
//! session lifecycle. The current user is re-derived from the cookie on
//! every page load rather than held in any process-wide state.

pub mod handlers;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use bcrypt::DEFAULT_COST;
use chrono::{Duration, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{Role, UserRow};

/// Institutional domain required for student accounts.
pub const STUDENT_EMAIL_DOMAIN: &str = "@emich.edu";
pub const STUDENT_EMAIL_ERROR: &str = "Student accounts must use an @emich.edu email.";

pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";
pub const EMAIL_TAKEN: &str = "An account with this email already exists.";

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";
const SESSION_TTL_DAYS: i64 = 7;

/// Emails are trimmed and lowercased before validation, lookup, or storage.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Sign-up rule: students must use the institutional domain; employers may
/// use any email. Runs before any database work.
pub fn check_signup_email(role: Role, normalized_email: &str) -> Result<(), &'static str> {
    if role == Role::Student && !normalized_email.ends_with(STUDENT_EMAIL_DOMAIN) {
        return Err(STUDENT_EMAIL_ERROR);
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(bcrypt::hash(password, DEFAULT_COST).map_err(anyhow::Error::from)?)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    Ok(bcrypt::verify(password, password_hash).map_err(anyhow::Error::from)?)
}

/// The authenticated user attached to a request.
#[derive(Debug, Clone, FromRow)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Resolves the session cookie to its user. `None` covers a missing cookie,
/// a malformed token, and an expired or revoked session alike.
pub async fn session_user(pool: &PgPool, jar: &CookieJar) -> Result<Option<SessionUser>, AppError> {
    let Some(cookie) = jar.get(SESSION_COOKIE).filter(|c| !c.value().is_empty()) else {
        return Ok(None);
    };
    let Ok(token) = cookie.value().parse::<Uuid>() else {
        return Ok(None);
    };

    let user = sqlx::query_as::<_, SessionUser>(
        "SELECT u.user_id, u.email
         FROM sessions s
         JOIN users u ON u.user_id = s.user_id
         WHERE s.token = $1 AND s.expires_at > now()",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Inserts a session row and returns the token to set as a cookie.
pub async fn issue_session(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: Uuid,
) -> Result<Uuid, sqlx::Error> {
    let token = Uuid::new_v4();
    let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);

    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(executor)
        .await?;

    Ok(token)
}

/// Deletes the session row named by the cookie, if any.
pub async fn revoke_session(pool: &PgPool, jar: &CookieJar) -> Result<(), AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(token) = cookie.value().parse::<Uuid>() {
            sqlx::query("DELETE FROM sessions WHERE token = $1")
                .bind(token)
                .execute(pool)
                .await?;
        }
    }
    Ok(())
}

/// Creates the account atomically: the users row, its role row, and a first
/// session commit together or not at all.
pub async fn create_account(
    pool: &PgPool,
    email: &str,
    password: &str,
    role: Role,
) -> Result<(UserRow, Uuid), AppError> {
    let password_hash = hash_password(password)?;

    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (user_id, email, password_hash)
         VALUES ($1, $2, $3)
         RETURNING user_id, email, password_hash",
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(&password_hash)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
        .bind(user.user_id)
        .bind(role.as_str())
        .execute(&mut *tx)
        .await?;

    let token = issue_session(&mut *tx, user.user_id).await?;

    tx.commit().await?;

    tracing::info!("created {} account for {}", role.as_str(), user.email);
    Ok((user, token))
}

/// Checks email/password against the users table. `None` means the email is
/// unknown or the password does not match; callers render `INVALID_CREDENTIALS`.
pub async fn verify_credentials(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<Option<UserRow>, AppError> {
    let Some(user) = sqlx::query_as::<_, UserRow>(
        "SELECT user_id, email, password_hash FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    if verify_password(password, &user.password_hash)? {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

/// Postgres unique_violation, used to give duplicate emails a readable message.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Builds the HttpOnly cookie for a freshly issued session token.
pub fn session_cookie(token: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Expired counterpart of `session_cookie`, used on sign-out.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_email("  Jane@EMich.EDU \n"), "jane@emich.edu");
        assert_eq!(normalize_email("boss@acme.com"), "boss@acme.com");
    }

    #[test]
    fn student_with_institutional_email_passes() {
        assert!(check_signup_email(Role::Student, "jane@emich.edu").is_ok());
    }

    #[test]
    fn student_with_outside_email_is_rejected_locally() {
        let err = check_signup_email(Role::Student, "john@gmail.com").unwrap_err();
        assert_eq!(err, "Student accounts must use an @emich.edu email.");
    }

    #[test]
    fn employer_may_use_any_domain() {
        assert!(check_signup_email(Role::Employer, "boss@acme.com").is_ok());
        assert!(check_signup_email(Role::Employer, "grad@emich.edu").is_ok());
    }

    #[test]
    fn domain_check_runs_on_the_normalized_form() {
        // Callers normalize first; mixed case would otherwise slip through.
        let email = normalize_email(" Jane@EMICH.edu ");
        assert!(check_signup_email(Role::Student, &email).is_ok());
    }

    #[test]
    fn role_round_trips_through_its_text_form() {
        assert_eq!(Role::Student.as_str(), "STUDENT");
        assert_eq!(Role::Employer.as_str(), "EMPLOYER");
    }

    #[test]
    fn verify_accepts_only_the_original_password() {
        // Low cost keeps the test fast; verification follows the hash's cost.
        let hash = bcrypt::hash("hunter2", 4).unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn session_cookie_is_http_only_and_scoped_to_root() {
        let token = Uuid::new_v4();
        let cookie = session_cookie(token);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), token.to_string());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
