//! Telegram webhook endpoint.
//!
//! - POST /api/tg-webhook - Receive bot updates

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use serde_json::{Value, json};

use crate::{
    clients::telegram::Update, error::AppError, middleware::auth::hash_key, state::AppState,
};

/// Header Telegram fills with the secret given to `setWebhook`.
pub const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Compare digests rather than the raw secrets, like the dashboard key check.
fn secret_matches(presented: Option<&str>, expected: &str) -> bool {
    presented.is_some_and(|secret| hash_key(secret) == hash_key(expected))
}

/// Receive one bot update.
///
/// # Security
///
/// The secret header is checked before the body is even parsed; a wrong or
/// missing secret is answered with 403.
///
/// # Response
///
/// - **200**: `{"ok": true}` once the update has been handled
/// - **400**: body is not a Telegram update
/// - **403**: invalid secret
/// - **5xx**: the bot could not reply to the sender
pub async fn receive_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let secret = headers.get(SECRET_HEADER).and_then(|h| h.to_str().ok());

    if !secret_matches(secret, &state.webhook_secret) {
        tracing::warn!("Rejected webhook call with invalid secret");
        return Err(AppError::InvalidWebhookSecret);
    }

    let update: Update = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid update: {e}")))?;

    let update_id = update.update_id;

    if let Err(e) = state.bot.handle_update(update).await {
        tracing::error!(update_id, error = %e, "Webhook error");
        return Err(e);
    }

    Ok(Json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_must_be_present_and_equal() {
        assert!(secret_matches(Some("hook-secret"), "hook-secret"));
        assert!(!secret_matches(Some("hook-secreT"), "hook-secret"));
        assert!(!secret_matches(Some(""), "hook-secret"));
        assert!(!secret_matches(None, "hook-secret"));
    }
}
