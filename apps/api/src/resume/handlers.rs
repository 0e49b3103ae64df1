//! Axum route handlers for resume intake and analysis.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::consultants::repository::{get_consultant, store_resume};
use crate::errors::AppError;
use crate::models::consultant::{ConsultantRow, ConsultantView};
use crate::resume::extract::{extract_text, ExtractError};
use crate::resume::screening::{screen_resume, ScreeningReport};
use crate::resume::skills::{extract_skills, generate_feedback, Feedback, SkillExtraction};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ResumeUploadResponse {
    pub consultant: ConsultantView,
    pub extracted_chars: usize,
}

#[derive(Debug, Deserialize)]
pub struct ResumeCheckRequest {
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub skills: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

async fn load_consultant(state: &AppState, id: i32) -> Result<ConsultantRow, AppError> {
    get_consultant(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Consultant {id} not found")))
}

/// POST /api/v1/consultants/:id/resume
///
/// Multipart upload with a `file` part (.pdf, .docx or .txt). Stores the extracted text on
/// the consultant and marks the resume as updated.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ResumeUploadResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::Validation("No file part".to_string()))?;
    if filename.trim().is_empty() {
        return Err(AppError::Validation("No selected file".to_string()));
    }

    // Fail fast on unknown consultants before parsing the document
    load_consultant(&state, id).await?;

    info!("Resume received for consultant {id}: {filename} ({} bytes)", bytes.len());

    let name = filename.clone();
    let text = tokio::task::spawn_blocking(move || extract_text(&name, &bytes))
        .await
        .map_err(|e| AppError::Validation(format!("Could not read resume: {e}")))?
        .map_err(|e: ExtractError| AppError::Validation(e.to_string()))?;

    info!("Extracted {} characters from {filename}", text.chars().count());

    let row = store_resume(&state.db, id, &filename, &text)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Consultant {id} not found")))?;

    Ok(Json(ResumeUploadResponse {
        extracted_chars: text.chars().count(),
        consultant: row.into(),
    }))
}

/// POST /api/v1/consultants/:id/resume/check
///
/// Keyword screening of the stored resume. Local only, no model call.
pub async fn handle_check_resume(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<ResumeCheckRequest>,
) -> Result<Json<ScreeningReport>, AppError> {
    let consultant = load_consultant(&state, id).await?;
    Ok(Json(screen_resume(&consultant.resume_text, &request.keywords)))
}

/// POST /api/v1/consultants/:id/skills
///
/// Technical and soft skills extracted from the stored resume by the generator chain.
pub async fn handle_extract_skills(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SkillExtraction>, AppError> {
    let consultant = load_consultant(&state, id).await?;
    let extraction = extract_skills(&consultant.resume_text, &state.generator).await?;
    info!("Extracted skills for consultant {id} using {}", extraction.model);
    Ok(Json(extraction))
}

/// POST /api/v1/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<Feedback>, AppError> {
    let feedback = generate_feedback(&request.skills, &state.generator).await?;
    Ok(Json(feedback))
}
