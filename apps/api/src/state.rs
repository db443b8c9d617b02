use std::sync::Arc;

use sqlx::PgPool;

use crate::storage::Storage;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Object store holding resume PDFs. Behind a trait so tests can swap
    /// in an in-memory recorder.
    pub storage: Arc<dyn Storage>,
}
