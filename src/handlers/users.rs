//! User listing.
//!
//! - GET /api/v1/users

use axum::{Json, extract::State};

use crate::{db::DbPool, error::AppError, models::user::User};

/// All users, oldest first.
pub async fn list_users(State(pool): State<DbPool>) -> Result<Json<Vec<User>>, AppError> {
    let users = sqlx::query_as::<_, User>(
        "SELECT user_id, name, telegram, created_at FROM users ORDER BY user_id",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(users))
}
