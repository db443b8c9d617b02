//! Askama template structs for the four pages.

use askama::Template;

use crate::auth::SessionUser;
use crate::models::profile::StudentProfileRow;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub email: Option<String>,
}

#[derive(Template)]
#[template(path = "sign_in.html")]
pub struct SignInPage {
    pub email: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "sign_up.html")]
pub struct SignUpPage {
    pub role: &'static str,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfilePage {
    pub email: String,
    pub full_name: String,
    pub major: String,
    pub grad_term: String,
    pub resume_path: Option<String>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ProfilePage {
    /// Maps row columns onto form fields; a missing row leaves every field
    /// at its empty default.
    pub fn from_row(
        user: &SessionUser,
        row: Option<&StudentProfileRow>,
        error: Option<String>,
        message: Option<String>,
    ) -> Self {
        Self {
            email: user.email.clone(),
            full_name: row
                .and_then(|r| r.full_name.clone())
                .unwrap_or_default(),
            major: row.and_then(|r| r.major.clone()).unwrap_or_default(),
            grad_term: row.and_then(|r| r.grad_term.clone()).unwrap_or_default(),
            resume_path: row.and_then(|r| r.resume_path.clone()),
            error,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn session_user() -> SessionUser {
        SessionUser {
            user_id: Uuid::new_v4(),
            email: "jane@emich.edu".to_string(),
        }
    }

    fn profile_row(user_id: Uuid) -> StudentProfileRow {
        StudentProfileRow {
            full_name: Some("Jane Doe".to_string()),
            major: Some("Computer Science".to_string()),
            grad_term: Some("Fall 2026".to_string()),
            resume_path: Some(format!("{user_id}/resume.pdf")),
        }
    }

    #[test]
    fn home_shows_the_signed_in_email() {
        let html = HomePage {
            email: Some("jane@emich.edu".to_string()),
        }
        .render()
        .unwrap();
        assert!(html.contains("Signed in as"));
        assert!(html.contains("jane@emich.edu"));
        assert!(html.contains("Sign out"));
    }

    #[test]
    fn home_offers_auth_links_when_signed_out() {
        let html = HomePage { email: None }.render().unwrap();
        assert!(html.contains("You are not signed in."));
        assert!(html.contains("/auth/sign-in"));
        assert!(html.contains("/auth/sign-up"));
    }

    #[test]
    fn sign_in_keeps_the_submitted_email_on_error() {
        let html = SignInPage {
            email: "jane@emich.edu".to_string(),
            error: Some("Invalid email or password.".to_string()),
        }
        .render()
        .unwrap();
        assert!(html.contains(r#"value="jane@emich.edu""#));
        assert!(html.contains("Invalid email or password."));
    }

    #[test]
    fn sign_up_keeps_the_chosen_role_selected() {
        let html = SignUpPage {
            role: "EMPLOYER",
            email: "boss@acme.com".to_string(),
            error: None,
        }
        .render()
        .unwrap();
        assert!(html.contains(r#"value="EMPLOYER" selected"#));
        assert!(html.contains(r#"value="boss@acme.com""#));
    }

    #[test]
    fn profile_renders_row_values_and_saved_path() {
        let user = session_user();
        let row = profile_row(user.user_id);
        let html = ProfilePage::from_row(&user, Some(&row), None, None)
            .render()
            .unwrap();
        assert!(html.contains(r#"value="Jane Doe""#));
        assert!(html.contains(r#"value="Computer Science""#));
        assert!(html.contains(r#"value="Fall 2026""#));
        assert!(html.contains("resume.pdf"));
    }

    #[test]
    fn profile_without_a_row_renders_empty_fields() {
        let user = session_user();
        let page = ProfilePage::from_row(&user, None, None, None);
        assert!(page.full_name.is_empty());
        assert!(page.major.is_empty());
        assert!(page.grad_term.is_empty());
        assert!(page.resume_path.is_none());

        let html = page.render().unwrap();
        assert!(!html.contains("Saved as:"));
    }

    #[test]
    fn profile_flash_slots_render_one_at_a_time() {
        let user = session_user();
        let html = ProfilePage::from_row(&user, None, Some("Resume must be a PDF.".into()), None)
            .render()
            .unwrap();
        assert!(html.contains("Resume must be a PDF."));
        assert!(!html.contains("Profile saved."));
    }
}
