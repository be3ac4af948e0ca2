//! Data models representing database entities and API payloads.

/// Fixed expense categories
pub mod category;
/// Expense rows and the daily view
pub mod expense;
/// Pagination helpers
pub mod page;
/// Receipt rows
pub mod receipt;
/// Aggregates for the stats endpoints
pub mod stats;
/// Tracker users
pub mod user;
/// Receipt vendors
pub mod vendor;
