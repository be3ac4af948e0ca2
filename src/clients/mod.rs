//! HTTP clients for the external APIs the bot talks to.

/// Google Gemini content generation
pub mod gemini;
/// Telegram Bot API
pub mod telegram;
