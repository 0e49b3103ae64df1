use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::consultants::repository::load_candidates;
use crate::errors::AppError;
use crate::shortlist::shortlister::{ScoredCandidate, Shortlist, Shortlister};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ShortlistRequest {
    #[serde(default)]
    pub query: String,
    /// Falls back to the configured default when absent.
    pub threshold: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct ShortlistEntry {
    pub candidate_id: i32,
    pub display_name: String,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct ShortlistResponse {
    pub matching: Vec<ShortlistEntry>,
    pub not_matching: Vec<ShortlistEntry>,
    /// Candidates left out because their embedding could not be obtained or scored.
    pub excluded: usize,
}

impl From<ScoredCandidate> for ShortlistEntry {
    fn from(scored: ScoredCandidate) -> Self {
        Self {
            candidate_id: scored.candidate.id,
            display_name: scored.candidate.display_name,
            score: scored.score,
        }
    }
}

impl From<Shortlist> for ShortlistResponse {
    fn from(shortlist: Shortlist) -> Self {
        Self {
            matching: shortlist.matching.into_iter().map(Into::into).collect(),
            not_matching: shortlist.not_matching.into_iter().map(Into::into).collect(),
            excluded: shortlist.excluded.len(),
        }
    }
}

/// POST /api/v1/admin/shortlist
///
/// Ranks every consultant's resume against a free-text query.
/// 400 on an empty query or bad threshold, 503 when the query cannot be embedded.
pub async fn handle_shortlist(
    State(state): State<AppState>,
    Json(request): Json<ShortlistRequest>,
) -> Result<Json<ShortlistResponse>, AppError> {
    let threshold = request
        .threshold
        .unwrap_or_else(|| state.shortlister.default_threshold());
    // Reject bad input before loading candidates
    Shortlister::validate(&request.query, threshold)?;

    let candidates = load_candidates(&state.db).await?;
    let shortlist = state
        .shortlister
        .shortlist(&request.query, candidates, threshold)
        .await?;

    Ok(Json(shortlist.into()))
}
