//! Receipt service - listing, editing and the transactional insert of a
//! scanned receipt with its line items.
//!
//! # Atomicity Guarantees
//!
//! A scanned receipt and all of its expense rows are written in one
//! PostgreSQL transaction. Either the receipt appears with every item or
//! nothing is written.

use sqlx::{Postgres, QueryBuilder};

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        page::{Page, Pagination},
        receipt::{Receipt, ReceiptResponse, SortOrder, UpdateReceiptRequest},
        vendor::Vendor,
    },
    services::receipt_ingest::ParsedReceipt,
};

const RECEIPT_COLUMNS: &str = "receipt_id, vendor, user_id, amount, receipt_date, created_at";

/// Paged receipts ordered by receipt date.
pub async fn list_receipts(
    pool: &DbPool,
    pagination: Pagination,
    sort_order: SortOrder,
) -> Result<Page<ReceiptResponse>, AppError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM receipt")
        .fetch_one(pool)
        .await?;

    // ORDER BY direction cannot be a bind parameter; it comes from a closed enum
    let receipts = sqlx::query_as::<_, Receipt>(&format!(
        "SELECT {RECEIPT_COLUMNS} FROM receipt
         ORDER BY receipt_date {order}, receipt_id {order}
         LIMIT $1 OFFSET $2",
        order = sort_order.as_sql(),
    ))
    .bind(pagination.page_size)
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page::new(
        receipts.into_iter().map(Into::into).collect(),
        total,
        pagination,
    ))
}

pub async fn update_receipt(
    pool: &DbPool,
    receipt_id: i32,
    request: UpdateReceiptRequest,
) -> Result<ReceiptResponse, AppError> {
    if request.total_amount.is_some_and(|a| a < 0) {
        return Err(AppError::InvalidRequest(
            "Total amount must not be negative".to_string(),
        ));
    }

    let receipt = sqlx::query_as::<_, Receipt>(&format!(
        "UPDATE receipt SET receipt_date = $1, amount = $2
         WHERE receipt_id = $3
         RETURNING {RECEIPT_COLUMNS}"
    ))
    .bind(request.receipt_date)
    .bind(request.total_amount)
    .bind(receipt_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::ReceiptNotFound)?;

    tracing::info!(receipt_id, "Receipt updated");

    Ok(receipt.into())
}

/// Fails with `ReceiptNotFound` when the id does not exist.
pub async fn ensure_receipt_exists(pool: &DbPool, receipt_id: i32) -> Result<(), AppError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM receipt WHERE receipt_id = $1)")
            .bind(receipt_id)
            .fetch_one(pool)
            .await?;

    if !exists {
        return Err(AppError::ReceiptNotFound);
    }

    Ok(())
}

/// Insert a validated receipt and its items for a Telegram user.
///
/// # Process
///
/// 1. Start database transaction
/// 2. Resolve the user by Telegram username
/// 3. Insert the receipt, returning its id
/// 4. Bulk-insert every item as an expense of that receipt
/// 5. Commit (any error before this rolls everything back)
///
/// Returns the new receipt id.
pub async fn insert_parsed_receipt(
    pool: &DbPool,
    telegram_username: &str,
    vendor: Option<Vendor>,
    parsed: &ParsedReceipt,
) -> Result<i32, AppError> {
    let mut tx = pool.begin().await?;

    let user_id: i32 = sqlx::query_scalar("SELECT user_id FROM users WHERE telegram = $1")
        .bind(telegram_username)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::UnknownTelegramUser(telegram_username.to_string()))?;

    let receipt_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO receipt (vendor, user_id, amount, receipt_date)
        VALUES ($1, $2, $3, $4)
        RETURNING receipt_id
        "#,
    )
    .bind(vendor.map(Vendor::id))
    .bind(user_id)
    .bind(parsed.total_price)
    .bind(parsed.date)
    .fetch_one(&mut *tx)
    .await?;

    if !parsed.items_list.is_empty() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO expense (name, category_id, amount, receipt_id, expense_date, user_id) ",
        );

        builder.push_values(&parsed.items_list, |mut row, item| {
            row.push_bind(&item.name)
                .push_bind(item.category.id())
                .push_bind(item.price)
                .push_bind(receipt_id)
                .push_bind(parsed.date)
                .push_bind(user_id);
        });

        builder.build().execute(&mut *tx).await?;
    }

    // Commit ALL changes atomically
    tx.commit().await?;

    tracing::info!(
        receipt_id,
        items = parsed.items_list.len(),
        total = parsed.total_price,
        "Receipt stored"
    );

    Ok(receipt_id)
}
