use std::sync::Arc;

use sqlx::PgPool;

use crate::inference::gemini::GeminiGenerator;
use crate::inference::FallbackChain;
use crate::shortlist::shortlister::Shortlister;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Text generation with model fallback (skills, feedback).
    pub generator: FallbackChain<GeminiGenerator>,
    /// Embedding-based shortlisting. The provider behind it is swappable.
    pub shortlister: Arc<Shortlister>,
}
