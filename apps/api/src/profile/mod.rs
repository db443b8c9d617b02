//! Student profile rows and resume rules. All writes are upserts keyed on
//! `user_id`, so a repeated submission lands on the same single row.

pub mod handlers;

use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::models::profile::StudentProfileRow;

/// Only this exact media type is accepted for resume uploads.
pub const RESUME_CONTENT_TYPE: &str = "application/pdf";

/// Validity window for resume view links.
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(60);

/// Request body ceiling for the upload route.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Value written to `auth_type` on every profile save.
pub const AUTH_TYPE: &str = "citizen";

pub const MSG_PROFILE_SAVED: &str = "Profile saved.";
pub const MSG_RESUME_UPLOADED: &str = "Resume uploaded.";
pub const ERR_NO_FILE: &str = "Choose a PDF first.";
pub const ERR_NOT_PDF: &str = "Resume must be a PDF.";
pub const ERR_NO_RESUME: &str = "No resume uploaded yet.";

/// Object key a user's resume always lives under. The row's `resume_path`
/// and the uploaded object key are both derived from here, which keeps the
/// two in agreement.
pub fn resume_object_key(user_id: Uuid) -> String {
    format!("{user_id}/resume.pdf")
}

/// The uploaded part must declare the PDF media type exactly.
pub fn is_pdf(content_type: Option<&str>) -> bool {
    content_type == Some(RESUME_CONTENT_TYPE)
}

/// Editable form fields after trimming. Empty strings collapse to None and
/// are stored as NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub major: Option<String>,
    pub grad_term: Option<String>,
}

impl ProfileUpdate {
    pub fn from_form(full_name: &str, major: &str, grad_term: &str) -> Self {
        Self {
            full_name: non_empty(full_name),
            major: non_empty(major),
            grad_term: non_empty(grad_term),
        }
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Fetches the at-most-one profile row for a user.
pub async fn fetch_profile(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<StudentProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentProfileRow>(
        "SELECT full_name, major, grad_term, resume_path
         FROM student_profiles
         WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Upserts the editable fields. `resume_path` is left untouched so a save
/// never drops the pointer set by an earlier upload.
pub async fn save_profile(
    pool: &PgPool,
    user_id: Uuid,
    update: &ProfileUpdate,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO student_profiles (user_id, full_name, major, grad_term, auth_type)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (user_id) DO UPDATE
         SET full_name = EXCLUDED.full_name,
             major = EXCLUDED.major,
             grad_term = EXCLUDED.grad_term,
             auth_type = EXCLUDED.auth_type,
             updated_at = now()",
    )
    .bind(user_id)
    .bind(&update.full_name)
    .bind(&update.major)
    .bind(&update.grad_term)
    .bind(AUTH_TYPE)
    .execute(pool)
    .await?;

    Ok(())
}

/// Points the row at a freshly uploaded resume, re-sending the stored
/// name/major (empty string when absent) alongside the new path.
pub async fn set_resume_path(
    pool: &PgPool,
    user_id: Uuid,
    existing: Option<&StudentProfileRow>,
    resume_path: &str,
) -> Result<(), sqlx::Error> {
    let full_name = existing
        .and_then(|r| r.full_name.clone())
        .unwrap_or_default();
    let major = existing.and_then(|r| r.major.clone()).unwrap_or_default();
    let grad_term = existing.and_then(|r| r.grad_term.clone());

    sqlx::query(
        "INSERT INTO student_profiles (user_id, full_name, major, grad_term, resume_path)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (user_id) DO UPDATE
         SET full_name = EXCLUDED.full_name,
             major = EXCLUDED.major,
             grad_term = EXCLUDED.grad_term,
             resume_path = EXCLUDED.resume_path,
             updated_at = now()",
    )
    .bind(user_id)
    .bind(full_name)
    .bind(major)
    .bind(grad_term)
    .bind(resume_path)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_key_is_deterministic_per_user() {
        let id = Uuid::parse_str("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap();
        assert_eq!(
            resume_object_key(id),
            "6ba7b810-9dad-11d1-80b4-00c04fd430c8/resume.pdf"
        );
    }

    #[test]
    fn only_the_exact_pdf_media_type_is_accepted() {
        assert!(is_pdf(Some("application/pdf")));
        assert!(!is_pdf(Some("application/PDF")));
        assert!(!is_pdf(Some("image/png")));
        assert!(!is_pdf(Some("application/pdf; charset=binary")));
        assert!(!is_pdf(None));
    }

    #[test]
    fn signed_url_ttl_is_sixty_seconds() {
        assert_eq!(SIGNED_URL_TTL.as_secs(), 60);
    }

    #[test]
    fn form_fields_are_trimmed() {
        let update = ProfileUpdate::from_form("  Jane Doe ", " Computer Science", "Fall 2026 ");
        assert_eq!(update.full_name.as_deref(), Some("Jane Doe"));
        assert_eq!(update.major.as_deref(), Some("Computer Science"));
        assert_eq!(update.grad_term.as_deref(), Some("Fall 2026"));
    }

    #[test]
    fn empty_and_whitespace_fields_collapse_to_none() {
        let update = ProfileUpdate::from_form("", "   ", "\t");
        assert_eq!(
            update,
            ProfileUpdate {
                full_name: None,
                major: None,
                grad_term: None,
            }
        );
    }
}
