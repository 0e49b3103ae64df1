use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::consultants::repository::{self, ConsultantFilter, ConsultantPatch};
use crate::errors::AppError;
use crate::models::consultant::ConsultantView;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AssignTrainingRequest {
    pub skill: String,
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Consultant {id} not found"))
}

/// GET /api/v1/consultants
pub async fn handle_list_consultants(
    State(state): State<AppState>,
    Query(filter): Query<ConsultantFilter>,
) -> Result<Json<Vec<ConsultantView>>, AppError> {
    let rows = repository::list_consultants(&state.db, &filter.normalized()).await?;
    Ok(Json(rows.into_iter().map(ConsultantView::from).collect()))
}

/// GET /api/v1/consultants/:id
pub async fn handle_get_consultant(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ConsultantView>, AppError> {
    let row = repository::get_consultant(&state.db, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(row.into()))
}

/// PUT /api/v1/consultants/:id
pub async fn handle_update_consultant(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<ConsultantPatch>,
) -> Result<Json<ConsultantView>, AppError> {
    patch.validate().map_err(AppError::Validation)?;

    let row = repository::update_consultant(&state.db, id, &patch)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(row.into()))
}

/// POST /api/v1/consultants/:id/assign_training
pub async fn handle_assign_training(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<AssignTrainingRequest>,
) -> Result<Json<ConsultantView>, AppError> {
    let skill = request.skill.trim();
    if skill.is_empty() {
        return Err(AppError::Validation("skill cannot be empty".to_string()));
    }

    let row = repository::assign_training(&state.db, id, skill)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!("Assigned training '{skill}' to consultant {id}");
    Ok(Json(row.into()))
}
