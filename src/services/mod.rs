//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle database transactions, validation, and the bot pipeline.

pub mod bot_service;
pub mod expense_service;
pub mod quick_entry;
pub mod receipt_ingest;
pub mod receipt_service;
pub mod stats_service;
