use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::{
    check_signup_email, create_account, is_unique_violation, issue_session, normalize_email,
    removal_cookie, revoke_session, session_cookie, session_user, verify_credentials, EMAIL_TAKEN,
    INVALID_CREDENTIALS,
};
use crate::errors::AppError;
use crate::models::user::Role;
use crate::state::AppState;
use crate::views::{HomePage, SignInPage, SignUpPage};

#[derive(Deserialize)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignUpInput {
    pub role: Role,
    pub email: String,
    pub password: String,
}

/// GET /
pub async fn home(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Html<String>, AppError> {
    let user = session_user(&state.db, &jar).await?;
    let page = HomePage {
        email: user.map(|u| u.email),
    };
    Ok(Html(page.render()?))
}

/// GET /auth/sign-in
pub async fn show_sign_in() -> Result<Html<String>, AppError> {
    let page = SignInPage {
        email: String::new(),
        error: None,
    };
    Ok(Html(page.render()?))
}

/// POST /auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<SignInInput>,
) -> Result<Response, AppError> {
    let email = normalize_email(&input.email);

    match verify_credentials(&state.db, &email, &input.password).await {
        Ok(Some(user)) => {
            let token = issue_session(&state.db, user.user_id).await?;
            tracing::info!("signed in {}", user.email);
            let jar = jar.add(session_cookie(token));
            Ok((jar, Redirect::to("/")).into_response())
        }
        Ok(None) => render_sign_in(&input.email, INVALID_CREDENTIALS),
        Err(e) => render_sign_in(&input.email, &e.to_string()),
    }
}

/// GET /auth/sign-up
pub async fn show_sign_up() -> Result<Html<String>, AppError> {
    let page = SignUpPage {
        role: Role::Student.as_str(),
        email: String::new(),
        error: None,
    };
    Ok(Html(page.render()?))
}

/// POST /auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<SignUpInput>,
) -> Result<Response, AppError> {
    let email = normalize_email(&input.email);

    // Local rule; a violation never reaches the database.
    if let Err(msg) = check_signup_email(input.role, &email) {
        return render_sign_up(input.role, &input.email, msg);
    }

    match create_account(&state.db, &email, &input.password, input.role).await {
        Ok((_user, token)) => {
            let jar = jar.add(session_cookie(token));
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(AppError::Database(e)) if is_unique_violation(&e) => {
            render_sign_up(input.role, &input.email, EMAIL_TAKEN)
        }
        Err(e) => render_sign_up(input.role, &input.email, &e.to_string()),
    }
}

/// POST /auth/sign-out
pub async fn sign_out(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    revoke_session(&state.db, &jar).await?;
    let jar = jar.remove(removal_cookie());
    Ok((jar, Redirect::to("/")).into_response())
}

/// Re-renders the sign-in form with the submitted email still populated.
fn render_sign_in(email: &str, error: &str) -> Result<Response, AppError> {
    let page = SignInPage {
        email: email.to_string(),
        error: Some(error.to_string()),
    };
    Ok(Html(page.render()?).into_response())
}

/// Re-renders the sign-up form, keeping the chosen role and email.
fn render_sign_up(role: Role, email: &str, error: &str) -> Result<Response, AppError> {
    let page = SignUpPage {
        role: role.as_str(),
        email: email.to_string(),
        error: Some(error.to_string()),
    };
    Ok(Html(page.render()?).into_response())
}
