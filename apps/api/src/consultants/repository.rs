use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::models::consultant::{Attendance, ConsultantRow, ResumeStatus, TrainingStatus};
use crate::shortlist::shortlister::Candidate;

/// Case-insensitive substring filters. Blank values match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsultantFilter {
    pub name: Option<String>,
    pub resume_status: Option<String>,
    pub training: Option<String>,
    pub attendance: Option<String>,
}

impl ConsultantFilter {
    /// Drops blank filters and trims the rest.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            name: clean(self.name),
            resume_status: clean(self.resume_status),
            training: clean(self.training),
            attendance: clean(self.attendance),
        }
    }
}

/// Partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsultantPatch {
    pub resume_status: Option<ResumeStatus>,
    pub attendance: Option<Attendance>,
    pub opportunities: Option<i32>,
    pub training: Option<TrainingStatus>,
}

impl ConsultantPatch {
    pub fn validate(&self) -> Result<(), String> {
        match self.opportunities {
            Some(n) if n < 0 => Err(format!("opportunities cannot be negative, got {n}")),
            _ => Ok(()),
        }
    }
}

pub async fn list_consultants(
    pool: &PgPool,
    filter: &ConsultantFilter,
) -> Result<Vec<ConsultantRow>, sqlx::Error> {
    sqlx::query_as::<_, ConsultantRow>(
        r#"
        SELECT * FROM consultants
        WHERE ($1::text IS NULL OR POSITION(LOWER($1) IN LOWER(name)) > 0)
          AND ($2::text IS NULL OR POSITION(LOWER($2) IN LOWER(resume_status)) > 0)
          AND ($3::text IS NULL OR POSITION(LOWER($3) IN LOWER(training)) > 0)
          AND ($4::text IS NULL OR POSITION(LOWER($4) IN LOWER(attendance)) > 0)
        ORDER BY id
        "#,
    )
    .bind(filter.name.as_deref())
    .bind(filter.resume_status.as_deref())
    .bind(filter.training.as_deref())
    .bind(filter.attendance.as_deref())
    .fetch_all(pool)
    .await
}

pub async fn get_consultant(pool: &PgPool, id: i32) -> Result<Option<ConsultantRow>, sqlx::Error> {
    sqlx::query_as::<_, ConsultantRow>("SELECT * FROM consultants WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update_consultant(
    pool: &PgPool,
    id: i32,
    patch: &ConsultantPatch,
) -> Result<Option<ConsultantRow>, sqlx::Error> {
    sqlx::query_as::<_, ConsultantRow>(
        r#"
        UPDATE consultants SET
            resume_status = COALESCE($2, resume_status),
            attendance    = COALESCE($3, attendance),
            opportunities = COALESCE($4, opportunities),
            training      = COALESCE($5, training),
            updated_at    = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(patch.resume_status.map(ResumeStatus::as_str))
    .bind(patch.attendance.map(Attendance::as_str))
    .bind(patch.opportunities)
    .bind(patch.training.map(TrainingStatus::as_str))
    .fetch_optional(pool)
    .await
}

/// Records the skill to train on and moves training to "In Progress".
pub async fn assign_training(
    pool: &PgPool,
    id: i32,
    skill: &str,
) -> Result<Option<ConsultantRow>, sqlx::Error> {
    sqlx::query_as::<_, ConsultantRow>(
        r#"
        UPDATE consultants SET
            assigned_training = $2,
            training          = $3,
            updated_at        = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(skill)
    .bind(TrainingStatus::InProgress.as_str())
    .fetch_optional(pool)
    .await
}

/// Stores extracted resume text and marks the resume as updated.
pub async fn store_resume(
    pool: &PgPool,
    id: i32,
    filename: &str,
    text: &str,
) -> Result<Option<ConsultantRow>, sqlx::Error> {
    sqlx::query_as::<_, ConsultantRow>(
        r#"
        UPDATE consultants SET
            resume_text     = $2,
            resume_filename = $3,
            resume_status   = $4,
            updated_at      = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(text)
    .bind(filename)
    .bind(ResumeStatus::Updated.as_str())
    .fetch_optional(pool)
    .await
}

/// Every consultant as a shortlisting candidate, in id order.
pub async fn load_candidates(pool: &PgPool) -> Result<Vec<Candidate>, sqlx::Error> {
    let rows: Vec<(i32, String, String)> =
        sqlx::query_as("SELECT id, name, resume_text FROM consultants ORDER BY id")
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(id, display_name, document_text)| Candidate {
            id,
            display_name,
            document_text,
        })
        .collect())
}

/// Inserts the default roster when the table is empty. Returns rows inserted.
pub async fn seed_defaults(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM consultants")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(0);
    }

    let defaults = [
        ("Arjun", ResumeStatus::Pending, Attendance::Missed, 0, TrainingStatus::NotStarted),
        ("Sneha", ResumeStatus::Updated, Attendance::Completed, 2, TrainingStatus::InProgress),
        ("Ravi", ResumeStatus::Pending, Attendance::Missed, 0, TrainingStatus::NotStarted),
        ("Meena", ResumeStatus::Updated, Attendance::Completed, 3, TrainingStatus::InProgress),
    ];

    let inserted = defaults.len() as u64;
    let mut tx = pool.begin().await?;
    for (name, resume_status, attendance, opportunities, training) in defaults {
        sqlx::query(
            r#"
            INSERT INTO consultants (name, resume_status, attendance, opportunities, training)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(name)
        .bind(resume_status.as_str())
        .bind(attendance.as_str())
        .bind(opportunities)
        .bind(training.as_str())
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!("Seeded {inserted} default consultants");
    Ok(inserted)
}
