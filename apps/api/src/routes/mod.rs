pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::consultants::handlers as consultants;
use crate::leave::handlers as leave;
use crate::resume::handlers as resume;
use crate::shortlist::handlers as shortlist;
use crate::state::AppState;

/// Resume uploads may exceed axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Consultants
        .route(
            "/api/v1/consultants",
            get(consultants::handle_list_consultants),
        )
        .route(
            "/api/v1/consultants/:id",
            get(consultants::handle_get_consultant).put(consultants::handle_update_consultant),
        )
        .route(
            "/api/v1/consultants/:id/assign_training",
            post(consultants::handle_assign_training),
        )
        // Resumes
        .route(
            "/api/v1/consultants/:id/resume",
            post(resume::handle_upload_resume).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/v1/consultants/:id/resume/check",
            post(resume::handle_check_resume),
        )
        .route(
            "/api/v1/consultants/:id/skills",
            post(resume::handle_extract_skills),
        )
        .route("/api/v1/feedback", post(resume::handle_feedback))
        // Leave
        .route(
            "/api/v1/consultants/:id/leave_requests",
            get(leave::handle_consultant_leave).post(leave::handle_submit_leave),
        )
        .route("/api/v1/leave_requests", get(leave::handle_list_leave))
        .route(
            "/api/v1/leave_requests/:id",
            patch(leave::handle_decide_leave),
        )
        // Shortlisting
        .route("/api/v1/admin/shortlist", post(shortlist::handle_shortlist))
        .with_state(state)
}
