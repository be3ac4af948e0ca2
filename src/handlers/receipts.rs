//! Receipt HTTP handlers.
//!
//! - GET /api/v1/receipts - Paged receipts
//! - PUT /api/v1/receipts/{id} - Edit date and total
//! - GET /api/v1/receipts/{id}/expenses - Line items of a receipt

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        expense::ExpenseResponse,
        page::{Page, Pagination},
        receipt::{ReceiptListQuery, ReceiptResponse, UpdateReceiptRequest},
    },
    services::{expense_service, receipt_service},
};

/// List receipts.
///
/// # Query Parameters
///
/// - `page`, `page_size` - 1-based paging, 15 per page by default
/// - `sort_order` - `asc` or `desc` (default) by receipt date
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "data": [
///     {
///       "receipt_id": 4,
///       "vendor": { "id": 1, "name": "Continente" },
///       "total_amount": 4523,
///       "receipt_date": "2025-03-01",
///       "user_id": 1,
///       "created_at": "2025-03-01T18:00:00Z"
///     }
///   ],
///   "total": 1,
///   "page": 1,
///   "page_size": 15
/// }
/// ```
pub async fn list_receipts(
    State(pool): State<DbPool>,
    Query(query): Query<ReceiptListQuery>,
) -> Result<Json<Page<ReceiptResponse>>, AppError> {
    let pagination = Pagination::new(query.page, query.page_size);

    let page = receipt_service::list_receipts(&pool, pagination, query.sort_order).await?;

    Ok(Json(page))
}

/// Edit a receipt's date and total.
///
/// ```json
/// { "receipt_date": "2025-03-01", "total_amount": null }
/// ```
pub async fn update_receipt(
    State(pool): State<DbPool>,
    Path(receipt_id): Path<i32>,
    Json(request): Json<UpdateReceiptRequest>,
) -> Result<Json<ReceiptResponse>, AppError> {
    let receipt = receipt_service::update_receipt(&pool, receipt_id, request).await?;

    Ok(Json(receipt))
}

/// Line items of a receipt.
///
/// Returns 404 for an unknown receipt rather than an empty list.
pub async fn receipt_expenses(
    State(pool): State<DbPool>,
    Path(receipt_id): Path<i32>,
) -> Result<Json<Vec<ExpenseResponse>>, AppError> {
    receipt_service::ensure_receipt_exists(&pool, receipt_id).await?;

    let expenses = expense_service::expenses_for_receipt(&pool, receipt_id).await?;

    Ok(Json(expenses))
}
