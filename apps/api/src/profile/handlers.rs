use askama::Template;
use axum::{
    extract::{Multipart, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::CookieJar;
use bytes::Bytes;
use serde::Deserialize;

use crate::auth::{session_user, SessionUser};
use crate::errors::AppError;
use crate::profile::{
    fetch_profile, is_pdf, resume_object_key, save_profile, set_resume_path, ProfileUpdate,
    ERR_NOT_PDF, ERR_NO_FILE, ERR_NO_RESUME, MSG_PROFILE_SAVED, MSG_RESUME_UPLOADED,
    RESUME_CONTENT_TYPE, SIGNED_URL_TTL,
};
use crate::state::AppState;
use crate::views::ProfilePage;

#[derive(Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub grad_term: String,
}

/// GET /student/profile
///
/// Requires a session; anonymous visitors are sent to sign-in and nothing
/// else runs for the request. A missing row leaves the form at its empty
/// defaults; a fetch error is shown in the page rather than replacing it.
pub async fn show_profile(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(user) = session_user(&state.db, &jar).await? else {
        return Ok(Redirect::to("/auth/sign-in").into_response());
    };

    let (row, error) = match fetch_profile(&state.db, user.user_id).await {
        Ok(row) => (row, None),
        Err(e) => (None, Some(e.to_string())),
    };

    let page = ProfilePage::from_row(&user, row.as_ref(), error, None);
    Ok(Html(page.render()?).into_response())
}

/// POST /student/profile
pub async fn save(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let Some(user) = session_user(&state.db, &jar).await? else {
        return Ok(Redirect::to("/auth/sign-in").into_response());
    };

    let update = ProfileUpdate::from_form(&form.full_name, &form.major, &form.grad_term);

    let (error, message) = match save_profile(&state.db, user.user_id, &update).await {
        Ok(()) => (None, Some(MSG_PROFILE_SAVED.to_string())),
        Err(e) => (Some(e.to_string()), None),
    };

    // Render the submitted values back, the way the form left them, with the
    // stored resume pointer alongside.
    let resume_path = fetch_profile(&state.db, user.user_id)
        .await
        .unwrap_or(None)
        .and_then(|r| r.resume_path);

    let page = ProfilePage {
        email: user.email.clone(),
        full_name: update.full_name.unwrap_or_default(),
        major: update.major.unwrap_or_default(),
        grad_term: update.grad_term.unwrap_or_default(),
        resume_path,
        error,
        message,
    };
    Ok(Html(page.render()?).into_response())
}

/// POST /student/profile/resume (multipart)
///
/// File-presence and media-type checks run before any storage call. The
/// upload and the row upsert are two sequential calls with no atomicity
/// across S3 and Postgres; a failed upsert after a successful upload leaves
/// the object ahead of the row pointer, and the surfaced error lets the user
/// retry (the retry re-uploads to the same key).
pub async fn upload_resume(
    State(state): State<AppState>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let Some(user) = session_user(&state.db, &jar).await? else {
        return Ok(Redirect::to("/auth/sign-in").into_response());
    };

    let mut file: Option<(Option<String>, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() == Some("resume") {
            // An empty file input still submits a part, with no filename.
            let has_file = field.file_name().is_some_and(|n| !n.is_empty());
            let content_type = field.content_type().map(|ct| ct.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(e.to_string()))?;
            if has_file {
                file = Some((content_type, bytes));
            }
        }
    }

    let Some((content_type, bytes)) = file else {
        return render_page(&state, &user, Some(ERR_NO_FILE.to_string()), None).await;
    };
    if !is_pdf(content_type.as_deref()) {
        return render_page(&state, &user, Some(ERR_NOT_PDF.to_string()), None).await;
    }

    let existing = fetch_profile(&state.db, user.user_id)
        .await
        .unwrap_or(None);

    let key = resume_object_key(user.user_id);
    if let Err(e) = state.storage.upload(&key, bytes, RESUME_CONTENT_TYPE).await {
        return render_page(&state, &user, Some(e.to_string()), None).await;
    }

    if let Err(e) = set_resume_path(&state.db, user.user_id, existing.as_ref(), &key).await {
        return render_page(&state, &user, Some(e.to_string()), None).await;
    }

    tracing::info!("stored resume for {} at {key}", user.email);
    render_page(&state, &user, None, Some(MSG_RESUME_UPLOADED.to_string())).await
}

/// GET /student/profile/resume
///
/// Redirects to a 60-second presigned URL; the page link opens it in a new
/// tab. A link that expires before the user follows it simply fails at the
/// store, with no refresh logic here.
pub async fn view_resume(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(user) = session_user(&state.db, &jar).await? else {
        return Ok(Redirect::to("/auth/sign-in").into_response());
    };

    let row = fetch_profile(&state.db, user.user_id).await?;
    let Some(path) = row.and_then(|r| r.resume_path) else {
        return render_page(&state, &user, Some(ERR_NO_RESUME.to_string()), None).await;
    };

    match state.storage.signed_url(&path, SIGNED_URL_TTL).await {
        Ok(url) => Ok(Redirect::temporary(&url).into_response()),
        Err(e) => render_page(&state, &user, Some(e.to_string()), None).await,
    }
}

/// Renders the profile page from the stored row plus a flash slot. Used by
/// the resume operations, which do not carry form state of their own.
async fn render_page(
    state: &AppState,
    user: &SessionUser,
    error: Option<String>,
    message: Option<String>,
) -> Result<Response, AppError> {
    let row = fetch_profile(&state.db, user.user_id).await.unwrap_or(None);
    let page = ProfilePage::from_row(user, row.as_ref(), error, message);
    Ok(Html(page.render()?).into_response())
}
