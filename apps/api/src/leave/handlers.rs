use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::consultants::repository::get_consultant;
use crate::errors::AppError;
use crate::leave::repository;
use crate::leave::validation::{check_decision, NewLeaveRequest};
use crate::models::leave::{LeaveRequestRow, LeaveStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaveStatusQuery {
    pub status: Option<LeaveStatus>,
}

#[derive(Debug, Deserialize)]
pub struct LeaveDecision {
    pub status: LeaveStatus,
}

async fn require_consultant(state: &AppState, id: i32) -> Result<(), AppError> {
    get_consultant(&state.db, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(format!("Consultant {id} not found")))
}

/// POST /api/v1/consultants/:id/leave_requests
pub async fn handle_submit_leave(
    State(state): State<AppState>,
    Path(consultant_id): Path<i32>,
    Json(request): Json<NewLeaveRequest>,
) -> Result<(StatusCode, Json<LeaveRequestRow>), AppError> {
    request.validate()?;
    require_consultant(&state, consultant_id).await?;

    let row = repository::insert_leave(&state.db, consultant_id, &request).await?;
    info!(
        "Consultant {consultant_id} requested {} day(s) of leave ({})",
        request.days(),
        row.id
    );
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/consultants/:id/leave_requests
pub async fn handle_consultant_leave(
    State(state): State<AppState>,
    Path(consultant_id): Path<i32>,
) -> Result<Json<Vec<LeaveRequestRow>>, AppError> {
    require_consultant(&state, consultant_id).await?;
    let rows = repository::list_for_consultant(&state.db, consultant_id).await?;
    Ok(Json(rows))
}

/// GET /api/v1/leave_requests
pub async fn handle_list_leave(
    State(state): State<AppState>,
    Query(params): Query<LeaveStatusQuery>,
) -> Result<Json<Vec<LeaveRequestRow>>, AppError> {
    let rows = repository::list_leave(&state.db, params.status).await?;
    Ok(Json(rows))
}

/// PATCH /api/v1/leave_requests/:id
pub async fn handle_decide_leave(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(decision): Json<LeaveDecision>,
) -> Result<Json<LeaveRequestRow>, AppError> {
    let existing = repository::get_leave(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Leave request {id} not found")))?;
    check_decision(&existing.status, decision.status)?;

    // Guarded UPDATE; a concurrent decision makes this return None
    let updated = repository::decide_leave(&state.db, id, decision.status)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Leave request {id} was already decided")))?;

    info!("Leave request {id} {}", updated.status.to_lowercase());
    Ok(Json(updated))
}
