//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Delegates to a service or runs a small query
//! 3. Returns HTTP response (JSON, status code)

/// Expense browsing and editing
pub mod expenses;
/// Service health
pub mod health;
/// Receipt browsing and editing
pub mod receipts;
/// Spending aggregates
pub mod stats;
/// Telegram bot webhook
pub mod telegram;
/// User listing
pub mod users;
