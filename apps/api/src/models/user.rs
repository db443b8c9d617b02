use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Account role chosen at sign-up. Stored as text in `user_roles`,
/// one row per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Employer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Employer => "EMPLOYER",
        }
    }
}

/// Account row as read for authentication. Never serialized to clients
/// (carries the password hash).
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub email: String,
    pub password_hash: String,
}
