//! Expense HTTP handlers.
//!
//! - GET /api/v1/expenses/daily - A day's expenses, receipts grouped
//! - GET /api/v1/expenses/monthly - Paged expenses of a month
//! - PUT /api/v1/expenses/{id} - Edit an expense

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Local;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        category::Category,
        expense::{
            DailyEntry, DailyExpensesQuery, ExpenseResponse, MonthlyExpensesQuery,
            UpdateExpenseRequest,
        },
        page::{Page, Pagination},
        stats::YearMonth,
    },
    services::expense_service,
};

/// Expenses of one day.
///
/// # Query Parameters
///
/// - `date` - `YYYY-MM-DD`, defaults to today
///
/// # Response (200 OK)
///
/// ```json
/// [
///   { "kind": "expense", "expense_id": 3, "name": "Coffee", "category": "restaurants-delivery", ... },
///   {
///     "kind": "receipt",
///     "receipt_id": 4,
///     "vendor": { "id": 1, "name": "Continente" },
///     "amount": 4523,
///     "items": [ { "expense_id": 5, "name": "Молоко (Leite)", ... } ]
///   }
/// ]
/// ```
pub async fn daily_expenses(
    State(pool): State<DbPool>,
    Query(query): Query<DailyExpensesQuery>,
) -> Result<Json<Vec<DailyEntry>>, AppError> {
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());

    let entries = expense_service::daily_entries(&pool, date).await?;

    Ok(Json(entries))
}

/// Expenses of a month, newest first.
///
/// # Query Parameters
///
/// - `month` - `MM-yyyy`, defaults to the current month
/// - `category` - category slug to filter by, empty for all
/// - `page`, `page_size` - 1-based paging, 15 per page by default
pub async fn monthly_expenses(
    State(pool): State<DbPool>,
    Query(query): Query<MonthlyExpensesQuery>,
) -> Result<Json<Page<ExpenseResponse>>, AppError> {
    let month = YearMonth::from_query(query.month.as_deref(), Local::now().date_naive());

    let category = category_filter(query.category.as_deref())?;

    let pagination = Pagination::new(query.page, query.page_size);

    let page = expense_service::expenses_for_month(&pool, month, category, pagination).await?;

    Ok(Json(page))
}

/// A blank `category` means no filter; an unknown slug is rejected.
fn category_filter(value: Option<&str>) -> Result<Option<Category>, AppError> {
    value
        .map(str::trim)
        .filter(|slug| !slug.is_empty())
        .map(|slug| {
            Category::from_slug(slug)
                .ok_or_else(|| AppError::InvalidRequest(format!("Unknown category: {slug}")))
        })
        .transpose()
}

/// Edit an expense.
///
/// # Request Body
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
/// # Response
///
/// - **200**: The updated expense
/// - **400**: Empty name or unknown category
/// - **404**: No such expense
pub async fn update_expense(
    State(pool): State<DbPool>,
    Path(expense_id): Path<i32>,
    Json(request): Json<UpdateExpenseRequest>,
) -> Result<Json<ExpenseResponse>, AppError> {
    let expense = expense_service::update_expense(&pool, expense_id, request).await?;

    Ok(Json(expense))
}
