pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::profile;
use crate::profile::handlers as profile_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(auth::home))
        .route("/auth/sign-in", get(auth::show_sign_in).post(auth::sign_in))
        .route("/auth/sign-up", get(auth::show_sign_up).post(auth::sign_up))
        .route("/auth/sign-out", post(auth::sign_out))
        .route(
            "/student/profile",
            get(profile_handlers::show_profile).post(profile_handlers::save),
        )
        .route(
            "/student/profile/resume",
            get(profile_handlers::view_resume)
                .post(profile_handlers::upload_resume)
                .layer(DefaultBodyLimit::max(profile::MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}
