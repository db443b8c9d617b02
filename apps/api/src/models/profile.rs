use sqlx::FromRow;

/// The at-most-one profile row per student, as read for the profile form.
/// `resume_path` holds the object key of the stored PDF when one exists.
#[derive(Debug, Clone, FromRow)]
pub struct StudentProfileRow {
    pub full_name: Option<String>,
    pub major: Option<String>,
    pub grad_term: Option<String>,
    pub resume_path: Option<String>,
}
