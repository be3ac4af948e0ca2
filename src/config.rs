//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `TELEGRAM_BOT_TOKEN` (required): Bot API token
/// - `TELEGRAM_WEBHOOK_SECRET` (required): value Telegram sends in `X-Telegram-Bot-Api-Secret-Token`
/// - `TELEGRAM_PERMITTED_USERS` (optional): comma-separated usernames allowed to talk to the bot
/// - `TELEGRAM_API_BASE` (optional): defaults to `https://api.telegram.org`
/// - `GEMINI_API_KEY` (required)
/// - `GEMINI_MODEL_NAME` (required), e.g. `gemini-2.5-flash`
/// - `GEMINI_API_BASE` (optional): defaults to `https://generativelanguage.googleapis.com`
/// - `DASHBOARD_API_KEY_HASH` (required): hex SHA-256 of the dashboard bearer key
/// - `CORS_ALLOWED_ORIGINS` (optional): comma-separated origins of the dashboard frontend
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    pub telegram_bot_token: String,

    pub telegram_webhook_secret: String,

    /// An empty list means nobody may use the bot.
    #[serde(default)]
    pub telegram_permitted_users: Vec<String>,

    #[serde(default = "default_telegram_api_base")]
    pub telegram_api_base: String,

    pub gemini_api_key: String,

    pub gemini_model_name: String,

    #[serde(default = "default_gemini_api_base")]
    pub gemini_api_base: String,

    pub dashboard_api_key_hash: String,

    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL, GEMINI_API_KEY)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required() -> Vec<(String, String)> {
        [
            ("DATABASE_URL", "postgres://localhost/expenses"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_WEBHOOK_SECRET", "s3cret"),
            ("GEMINI_API_KEY", "key"),
            ("GEMINI_MODEL_NAME", "gemini-2.5-flash"),
            ("DASHBOARD_API_KEY_HASH", "00"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn applies_defaults() {
        let config: Config = envy::from_iter(required()).unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.telegram_api_base, "https://api.telegram.org");
        assert_eq!(
            config.gemini_api_base,
            "https://generativelanguage.googleapis.com"
        );
        assert!(config.telegram_permitted_users.is_empty());
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn splits_permitted_users_on_commas() {
        let mut vars = required();
        vars.push((
            "TELEGRAM_PERMITTED_USERS".to_string(),
            "alice,bob".to_string(),
        ));

        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.telegram_permitted_users, vec!["alice", "bob"]);
    }

    #[test]
    fn missing_token_is_an_error() {
        let vars = required()
            .into_iter()
            .filter(|(k, _)| k != "TELEGRAM_BOT_TOKEN");

        assert!(envy::from_iter::<_, Config>(vars).is_err());
    }
}
