use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Idempotent schema, applied statement by statement at startup.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS consultants (
        id                SERIAL PRIMARY KEY,
        name              TEXT NOT NULL,
        resume_status     TEXT NOT NULL DEFAULT 'Pending',
        attendance        TEXT NOT NULL DEFAULT 'Missed',
        opportunities     INTEGER NOT NULL DEFAULT 0,
        training          TEXT NOT NULL DEFAULT 'Not Started',
        assigned_training TEXT,
        resume_text       TEXT NOT NULL DEFAULT '',
        resume_filename   TEXT,
        created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leave_requests (
        id            UUID PRIMARY KEY,
        consultant_id INTEGER NOT NULL REFERENCES consultants(id) ON DELETE CASCADE,
        start_date    DATE NOT NULL,
        end_date      DATE NOT NULL,
        reason        TEXT NOT NULL,
        status        TEXT NOT NULL DEFAULT 'Pending',
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        decided_at    TIMESTAMPTZ,
        CHECK (end_date >= start_date)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS leave_requests_consultant_idx ON leave_requests (consultant_id)",
];

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates any missing tables and indexes.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to apply schema")?;
    }
    info!("Database schema is up to date");
    Ok(())
}
