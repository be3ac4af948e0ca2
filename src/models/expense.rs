//! Expense data models and API request/response types.
//!
//! This module defines:
//! - `Expense`: Database entity representing one spending line
//! - `UpdateExpenseRequest`: Request body for editing an expense
//! - `ExpenseResponse`: Response body returned to clients
//! - `DailyEntry`: A day's expenses with receipt items grouped together

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{category::Category, vendor::Vendor};

/// Represents an expense record from the database.
///
/// # Database Table
///
/// Maps to the `expense` table. An expense either stands alone (typed into
/// the bot) or is one line item of a receipt (`receipt_id` set).
///
/// Amounts are stored as `i64` cents.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Expense {
    pub expense_id: i32,

    pub name: String,

    /// Foreign key into the seeded `category` table
    pub category_id: i32,

    /// Amount in cents. Receipt discount lines can be negative.
    pub amount: i64,

    pub receipt_id: Option<i32>,

    pub expense_date: NaiveDate,

    pub user_id: i32,

    pub created_at: DateTime<Utc>,
}

/// Response body for expense endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "expense_id": 17,
///   "name": "Молоко (Leite)",
///   "category": "groceries",
///   "category_label": "Groceries",
///   "amount": 89,
///   "receipt_id": 4,
///   "expense_date": "2025-03-01",
///   "user_id": 1,
///   "created_at": "2025-03-01T18:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseResponse {
    pub expense_id: i32,
    pub name: String,
    pub category: Category,
    pub category_label: &'static str,
    pub amount: i64,
    pub receipt_id: Option<i32>,
    pub expense_date: NaiveDate,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Expense> for ExpenseResponse {
    fn from(expense: Expense) -> Self {
        let category = Category::from_id_or_other(expense.category_id);

        Self {
            expense_id: expense.expense_id,
            name: expense.name,
            category,
            category_label: category.label(),
            amount: expense.amount,
            receipt_id: expense.receipt_id,
            expense_date: expense.expense_date,
            user_id: expense.user_id,
            created_at: expense.created_at,
        }
    }
}

/// Request body for `PUT /api/v1/expenses/{id}`.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Coffee",
///   "category": "restaurants-delivery",
///   "amount": 120,
///   "expense_date": "2025-03-02"
/// }
/// ```
///
/// # Validation
///
/// - `name`: Required, non-empty after trimming
/// - `category`: Optional slug, defaults to "other"; unknown slugs are rejected
#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    pub name: String,

    pub category: Option<String>,

    /// Amount in cents
    pub amount: i64,

    pub expense_date: NaiveDate,
}

/// Query string for `GET /api/v1/expenses/daily`.
#[derive(Debug, Deserialize)]
pub struct DailyExpensesQuery {
    /// Defaults to today
    pub date: Option<NaiveDate>,
}

/// Query string for `GET /api/v1/expenses/monthly`.
#[derive(Debug, Deserialize)]
pub struct MonthlyExpensesQuery {
    /// `MM-yyyy`, defaults to the current month
    pub month: Option<String>,

    /// Category slug filter
    pub category: Option<String>,

    pub page: Option<i64>,

    pub page_size: Option<i64>,
}

/// One row of the daily view.
///
/// Receipt items are folded under their receipt so the day reads like the
/// list of things paid for, not the list of every scanned line.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DailyEntry {
    Expense(ExpenseResponse),
    Receipt {
        receipt_id: i32,
        vendor: Option<Vendor>,
        /// Receipt total in cents
        amount: i64,
        items: Vec<ExpenseResponse>,
    },
}
