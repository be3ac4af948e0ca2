//! Liveness check for the tracker.
//!
//! - GET /health - public, no dashboard key needed

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{db::DbPool, error::AppError};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,

    /// Reported only after a round trip to PostgreSQL succeeded
    pub database: &'static str,

    pub checked_at: DateTime<Utc>,
}

/// Ping the database and report.
///
/// ```json
/// { "status": "ok", "database": "reachable", "checked_at": "2025-03-01T18:00:00Z" }
/// ```
///
/// An unreachable database is a 500 with the usual error body.
pub async fn health_check(State(pool): State<DbPool>) -> Result<Json<HealthResponse>, AppError> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&pool)
        .await?;

    Ok(Json(HealthResponse {
        status: "ok",
        database: "reachable",
        checked_at: Utc::now(),
    }))
}
