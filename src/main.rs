//! Expense Tracker - Main Application Entry Point
//!
//! A personal expense tracker: a JSON API for the dashboard (browsing and
//! editing expenses and receipts, spending stats) and a Telegram bot webhook
//! that turns receipt PDFs and short text messages into expenses.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Bot**: Telegram Bot API via webhook
//! - **Receipt extraction**: Google Gemini with a JSON response schema
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build the Telegram and Gemini clients
//! 5. Build HTTP router with routes and middleware
//! 6. Start server on configured port

mod clients;
mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    clients::{gemini::GeminiClient, telegram::TelegramClient},
    services::bot_service::BotService,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!(
        permitted_users = config.telegram_permitted_users.len(),
        model = %config.gemini_model_name,
        "Configuration loaded"
    );

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let telegram = TelegramClient::new(&config.telegram_api_base, &config.telegram_bot_token)?;
    let gemini = GeminiClient::new(
        &config.gemini_api_base,
        &config.gemini_api_key,
        &config.gemini_model_name,
    )?;

    let bot = BotService::new(
        pool.clone(),
        telegram,
        gemini,
        config.telegram_permitted_users.clone(),
    );

    let state = AppState {
        pool,
        bot: Arc::new(bot),
        webhook_secret: Arc::from(config.telegram_webhook_secret.as_str()),
        dashboard_key_hash: Arc::from(config.dashboard_api_key_hash.as_str()),
    };

    let app = routes::build_router(state, &config.cors_allowed_origins);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
