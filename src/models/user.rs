//! Users of the tracker.
//!
//! A user is identified on the bot side by their Telegram username, which is
//! how bot-entered expenses get attributed.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct User {
    pub user_id: i32,

    pub name: String,

    /// Telegram username without the leading `@`
    pub telegram: String,

    pub created_at: DateTime<Utc>,
}
