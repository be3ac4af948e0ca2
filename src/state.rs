//! Shared application state handed to every handler.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{db::DbPool, services::bot_service::BotService};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,

    pub bot: Arc<BotService>,

    /// Expected `X-Telegram-Bot-Api-Secret-Token` value
    pub webhook_secret: Arc<str>,

    /// Hex SHA-256 of the dashboard bearer key
    pub dashboard_key_hash: Arc<str>,
}

/// Lets handlers keep extracting `State<DbPool>` directly.
impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
