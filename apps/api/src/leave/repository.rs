use sqlx::PgPool;
use uuid::Uuid;

use crate::leave::validation::NewLeaveRequest;
use crate::models::leave::{LeaveRequestRow, LeaveStatus};

pub async fn insert_leave(
    pool: &PgPool,
    consultant_id: i32,
    request: &NewLeaveRequest,
) -> Result<LeaveRequestRow, sqlx::Error> {
    sqlx::query_as::<_, LeaveRequestRow>(
        r#"
        INSERT INTO leave_requests (id, consultant_id, start_date, end_date, reason, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(consultant_id)
    .bind(request.start_date)
    .bind(request.end_date)
    .bind(request.reason.trim())
    .bind(LeaveStatus::Pending.as_str())
    .fetch_one(pool)
    .await
}

pub async fn list_for_consultant(
    pool: &PgPool,
    consultant_id: i32,
) -> Result<Vec<LeaveRequestRow>, sqlx::Error> {
    sqlx::query_as::<_, LeaveRequestRow>(
        "SELECT * FROM leave_requests WHERE consultant_id = $1 ORDER BY created_at DESC",
    )
    .bind(consultant_id)
    .fetch_all(pool)
    .await
}

pub async fn list_leave(
    pool: &PgPool,
    status: Option<LeaveStatus>,
) -> Result<Vec<LeaveRequestRow>, sqlx::Error> {
    sqlx::query_as::<_, LeaveRequestRow>(
        r#"
        SELECT * FROM leave_requests
        WHERE ($1::text IS NULL OR status = $1)
        ORDER BY created_at DESC
        "#,
    )
    .bind(status.map(LeaveStatus::as_str))
    .fetch_all(pool)
    .await
}

pub async fn get_leave(pool: &PgPool, id: Uuid) -> Result<Option<LeaveRequestRow>, sqlx::Error> {
    sqlx::query_as::<_, LeaveRequestRow>("SELECT * FROM leave_requests WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Applies a decision only while the request is still pending.
/// Returns `None` if the request is missing or was decided concurrently.
pub async fn decide_leave(
    pool: &PgPool,
    id: Uuid,
    decision: LeaveStatus,
) -> Result<Option<LeaveRequestRow>, sqlx::Error> {
    sqlx::query_as::<_, LeaveRequestRow>(
        r#"
        UPDATE leave_requests SET status = $2, decided_at = NOW()
        WHERE id = $1 AND status = $3
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(decision.as_str())
    .bind(LeaveStatus::Pending.as_str())
    .fetch_optional(pool)
    .await
}
