//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::clients::{gemini::GeminiError, telegram::TelegramError};

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Invalid dashboard key or webhook secret
/// - **Resource Errors**: Requested expense or receipt not found
/// - **Upstream Errors**: Telegram Bot API or Gemini API failures
/// - **Validation Errors**: Invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Dashboard bearer key is missing or wrong.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Webhook call without the expected `X-Telegram-Bot-Api-Secret-Token`.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("invalid telegram secret")]
    InvalidWebhookSecret,

    /// Returns HTTP 404 Not Found.
    #[error("Expense not found")]
    ExpenseNotFound,

    /// Returns HTTP 404 Not Found.
    #[error("Receipt not found")]
    ReceiptNotFound,

    /// A permitted Telegram username has no row in `users`.
    ///
    /// Returns HTTP 422 Unprocessable Entity.
    #[error("No user registered for telegram username {0}")]
    UnknownTelegramUser(String),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// Returns HTTP 502 Bad Gateway.
    #[error("Telegram API error: {0}")]
    Telegram(#[from] TelegramError),

    /// Returns HTTP 502 Bad Gateway.
    #[error("Gemini API error: {0}")]
    Gemini(#[from] GeminiError),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Database and upstream failures hide their details from the client and
/// are logged instead.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key",
                self.to_string(),
            ),
            AppError::InvalidWebhookSecret => (
                StatusCode::FORBIDDEN,
                "invalid_webhook_secret",
                self.to_string(),
            ),
            AppError::ExpenseNotFound => {
                (StatusCode::NOT_FOUND, "expense_not_found", self.to_string())
            }
            AppError::ReceiptNotFound => {
                (StatusCode::NOT_FOUND, "receipt_not_found", self.to_string())
            }
            AppError::UnknownTelegramUser(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unknown_telegram_user",
                self.to_string(),
            ),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Telegram(ref e) => {
                tracing::error!(error = %e, "Telegram API failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_error",
                    "Telegram API request failed".to_string(),
                )
            }
            AppError::Gemini(ref e) => {
                tracing::error!(error = %e, "Gemini API failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_error",
                    "Gemini API request failed".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!(error = %e, "Database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
