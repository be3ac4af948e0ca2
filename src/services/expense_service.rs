//! Expense queries and edits.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        category::Category,
        expense::{DailyEntry, Expense, ExpenseResponse, UpdateExpenseRequest},
        page::{Page, Pagination},
        receipt::Receipt,
        stats::YearMonth,
        vendor::Vendor,
    },
    services::quick_entry::QuickExpense,
};

const EXPENSE_COLUMNS: &str =
    "expense_id, name, category_id, amount, receipt_id, expense_date, user_id, created_at";

/// All expenses of one day, receipt items grouped under their receipt.
pub async fn daily_entries(pool: &DbPool, date: NaiveDate) -> Result<Vec<DailyEntry>, AppError> {
    let expenses = sqlx::query_as::<_, Expense>(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM expense WHERE expense_date = $1 ORDER BY created_at, expense_id"
    ))
    .bind(date)
    .fetch_all(pool)
    .await?;

    let receipt_ids: Vec<i32> = expenses.iter().filter_map(|e| e.receipt_id).collect();

    let receipts = if receipt_ids.is_empty() {
        Vec::new()
    } else {
        sqlx::query_as::<_, Receipt>(
            "SELECT receipt_id, vendor, user_id, amount, receipt_date, created_at
             FROM receipt WHERE receipt_id = ANY($1)",
        )
        .bind(&receipt_ids)
        .fetch_all(pool)
        .await?
    };

    Ok(group_daily_entries(expenses, &receipts))
}

/// Fold receipt items into one entry per receipt, keeping first-seen order.
///
/// A receipt entry shows the receipt's stored total. When that is NULL it
/// falls back to the sum of the positive item amounts, as checked at ingest.
pub fn group_daily_entries(expenses: Vec<Expense>, receipts: &[Receipt]) -> Vec<DailyEntry> {
    let by_id: HashMap<i32, &Receipt> = receipts.iter().map(|r| (r.receipt_id, r)).collect();

    let mut entries: Vec<DailyEntry> = Vec::new();
    // receipt_id -> (index into `entries`, stored total present)
    let mut positions: HashMap<i32, (usize, bool)> = HashMap::new();

    for expense in expenses {
        let Some(receipt_id) = expense.receipt_id else {
            entries.push(DailyEntry::Expense(expense.into()));
            continue;
        };

        let (index, has_total) = *positions.entry(receipt_id).or_insert_with(|| {
            let receipt = by_id.get(&receipt_id);
            let stored_total = receipt.and_then(|r| r.amount);

            entries.push(DailyEntry::Receipt {
                receipt_id,
                vendor: receipt.and_then(|r| r.vendor).and_then(Vendor::from_id),
                amount: stored_total.unwrap_or(0),
                items: Vec::new(),
            });
            (entries.len() - 1, stored_total.is_some())
        });

        if let DailyEntry::Receipt { amount, items, .. } = &mut entries[index] {
            if !has_total && expense.amount > 0 {
                *amount = amount.saturating_add(expense.amount);
            }
            items.push(expense.into());
        }
    }

    entries
}

/// Paged expenses of a month, newest first, optionally of one category.
pub async fn expenses_for_month(
    pool: &DbPool,
    month: YearMonth,
    category: Option<Category>,
    pagination: Pagination,
) -> Result<Page<ExpenseResponse>, AppError> {
    let category_id = category.map(Category::id);

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM expense
         WHERE expense_date >= $1 AND expense_date < $2
           AND ($3::INT IS NULL OR category_id = $3)",
    )
    .bind(month.first_day())
    .bind(month.next_first_day())
    .bind(category_id)
    .fetch_one(pool)
    .await?;

    let expenses = sqlx::query_as::<_, Expense>(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM expense
         WHERE expense_date >= $1 AND expense_date < $2
           AND ($3::INT IS NULL OR category_id = $3)
         ORDER BY expense_date DESC, expense_id DESC
         LIMIT $4 OFFSET $5"
    ))
    .bind(month.first_day())
    .bind(month.next_first_day())
    .bind(category_id)
    .bind(pagination.page_size)
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page::new(
        expenses.into_iter().map(Into::into).collect(),
        total,
        pagination,
    ))
}

/// Line items of a receipt, in insertion order.
pub async fn expenses_for_receipt(
    pool: &DbPool,
    receipt_id: i32,
) -> Result<Vec<ExpenseResponse>, AppError> {
    let expenses = sqlx::query_as::<_, Expense>(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM expense WHERE receipt_id = $1 ORDER BY expense_id"
    ))
    .bind(receipt_id)
    .fetch_all(pool)
    .await?;

    Ok(expenses.into_iter().map(Into::into).collect())
}

/// Check an edit request and resolve its category.
pub fn validate_update(request: &UpdateExpenseRequest) -> Result<Category, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidRequest("Name must not be empty".to_string()));
    }

    match request.category.as_deref() {
        None => Ok(Category::Other),
        Some(slug) => Category::from_slug(slug)
            .ok_or_else(|| AppError::InvalidRequest(format!("Unknown category: {slug}"))),
    }
}

pub async fn update_expense(
    pool: &DbPool,
    expense_id: i32,
    request: UpdateExpenseRequest,
) -> Result<ExpenseResponse, AppError> {
    let category = validate_update(&request)?;

    let expense = sqlx::query_as::<_, Expense>(&format!(
        "UPDATE expense
         SET name = $1, category_id = $2, amount = $3, expense_date = $4
         WHERE expense_id = $5
         RETURNING {EXPENSE_COLUMNS}"
    ))
    .bind(request.name.trim())
    .bind(category.id())
    .bind(request.amount)
    .bind(request.expense_date)
    .bind(expense_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::ExpenseNotFound)?;

    tracing::info!(expense_id, "Expense updated");

    Ok(expense.into())
}

/// Record a bot quick-entry expense for the Telegram user, dated today.
pub async fn insert_quick_expense(
    pool: &DbPool,
    telegram_username: &str,
    expense: &QuickExpense,
) -> Result<Expense, AppError> {
    let user_id: i32 = sqlx::query_scalar("SELECT user_id FROM users WHERE telegram = $1")
        .bind(telegram_username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::UnknownTelegramUser(telegram_username.to_string()))?;

    let inserted = sqlx::query_as::<_, Expense>(&format!(
        "INSERT INTO expense (name, amount, category_id, user_id)
         VALUES ($1, $2, $3, $4)
         RETURNING {EXPENSE_COLUMNS}"
    ))
    .bind(&expense.name)
    .bind(expense.amount)
    .bind(expense.category.id())
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn expense(id: i32, receipt_id: Option<i32>, amount: i64) -> Expense {
        Expense {
            expense_id: id,
            name: format!("item {id}"),
            category_id: 1,
            amount,
            receipt_id,
            expense_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            user_id: 1,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn receipt(id: i32, vendor: Option<i32>, amount: Option<i64>) -> Receipt {
        Receipt {
            receipt_id: id,
            vendor,
            user_id: 1,
            amount,
            receipt_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn groups_receipt_items_in_first_seen_order() {
        let expenses = vec![
            expense(1, None, 120),
            expense(2, Some(7), 89),
            expense(3, Some(7), 228),
            expense(4, None, 300),
            expense(5, Some(7), -50),
        ];

        let entries = group_daily_entries(expenses, &[receipt(7, Some(1), Some(317))]);

        assert_eq!(entries.len(), 3);
        assert!(matches!(&entries[0], DailyEntry::Expense(e) if e.expense_id == 1));
        match &entries[1] {
            DailyEntry::Receipt {
                receipt_id,
                vendor,
                amount,
                items,
            } => {
                assert_eq!(*receipt_id, 7);
                assert_eq!(*vendor, Some(Vendor::Continente));
                assert_eq!(*amount, 317);
                let ids: Vec<i32> = items.iter().map(|i| i.expense_id).collect();
                assert_eq!(ids, vec![2, 3, 5]);
            }
            other => panic!("expected receipt entry, got {other:?}"),
        }
        assert!(matches!(&entries[2], DailyEntry::Expense(e) if e.expense_id == 4));
    }

    #[test]
    fn receipt_without_known_vendor_has_none() {
        let entries =
            group_daily_entries(vec![expense(1, Some(3), 10)], &[receipt(3, None, None)]);

        assert!(matches!(
            &entries[0],
            DailyEntry::Receipt { vendor: None, amount: 10, .. }
        ));
    }

    #[test]
    fn missing_total_falls_back_to_positive_items() {
        let expenses = vec![
            expense(1, Some(4), 89),
            expense(2, Some(4), 228),
            expense(3, Some(4), -50),
        ];

        let entries = group_daily_entries(expenses, &[receipt(4, Some(2), None)]);

        assert!(matches!(
            &entries[0],
            DailyEntry::Receipt { amount: 317, .. }
        ));
    }

    #[test]
    fn edited_total_wins_over_items() {
        let entries = group_daily_entries(
            vec![expense(1, Some(5), 89), expense(2, Some(5), 228)],
            &[receipt(5, Some(1), Some(400))],
        );

        assert!(matches!(
            &entries[0],
            DailyEntry::Receipt { amount: 400, items, .. } if items.len() == 2
        ));
    }

    #[test]
    fn daily_entry_serializes_with_kind_tag() {
        let entries = group_daily_entries(vec![expense(1, None, 120)], &[]);
        let value = serde_json::to_value(&entries[0]).unwrap();

        assert_eq!(value["kind"], "expense");
        assert_eq!(value["category"], "groceries");
        assert_eq!(value["amount"], 120);
    }

    fn update(name: &str, category: Option<&str>) -> UpdateExpenseRequest {
        UpdateExpenseRequest {
            name: name.to_string(),
            category: category.map(str::to_string),
            amount: 100,
            expense_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        }
    }

    #[test]
    fn update_defaults_category_to_other() {
        assert_eq!(validate_update(&update("Tea", None)).unwrap(), Category::Other);
        assert_eq!(
            validate_update(&update("Tea", Some("groceries"))).unwrap(),
            Category::Groceries
        );
    }

    #[test]
    fn update_rejects_blank_name_and_unknown_category() {
        assert!(matches!(
            validate_update(&update("  ", None)),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            validate_update(&update("Tea", Some("snacks"))),
            Err(AppError::InvalidRequest(_))
        ));
    }

    async fn add_user(pool: &DbPool, telegram: &str) -> i32 {
        sqlx::query_scalar("INSERT INTO users (name, telegram) VALUES ($1, $1) RETURNING user_id")
            .bind(telegram)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn coffee() -> QuickExpense {
        QuickExpense {
            name: "Coffee".to_string(),
            amount: 120,
            category: Category::RestaurantsDelivery,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn quick_expense_is_dated_today(pool: DbPool) {
        let user_id = add_user(&pool, "alice").await;
        let today: NaiveDate = sqlx::query_scalar("SELECT CURRENT_DATE")
            .fetch_one(&pool)
            .await
            .unwrap();

        let stored = insert_quick_expense(&pool, "alice", &coffee()).await.unwrap();

        assert_eq!(stored.name, "Coffee");
        assert_eq!(stored.amount, 120);
        assert_eq!(stored.category_id, Category::RestaurantsDelivery.id());
        assert_eq!(stored.receipt_id, None);
        assert_eq!(stored.expense_date, today);
        assert_eq!(stored.user_id, user_id);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn quick_expense_needs_known_user(pool: DbPool) {
        let result = insert_quick_expense(&pool, "mallory", &coffee()).await;

        assert!(matches!(result, Err(AppError::UnknownTelegramUser(_))));
        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM expense")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn updates_expense_fields(pool: DbPool) {
        add_user(&pool, "alice").await;
        let stored = insert_quick_expense(&pool, "alice", &coffee()).await.unwrap();
        let mut request = update("  Tea  ", Some("groceries"));
        request.amount = 95;

        let updated = update_expense(&pool, stored.expense_id, request).await.unwrap();

        assert_eq!(updated.name, "Tea");
        assert_eq!(updated.category, Category::Groceries);
        assert_eq!(updated.amount, 95);
        assert_eq!(
            updated.expense_date,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn missing_expense_is_not_found(pool: DbPool) {
        let result = update_expense(&pool, 999, update("Tea", None)).await;

        assert!(matches!(result, Err(AppError::ExpenseNotFound)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn month_page_filters_by_category(pool: DbPool) {
        add_user(&pool, "alice").await;
        let groceries = QuickExpense {
            category: Category::Groceries,
            ..coffee()
        };
        for expense in [coffee(), coffee(), groceries] {
            insert_quick_expense(&pool, "alice", &expense).await.unwrap();
        }
        let today: NaiveDate = sqlx::query_scalar("SELECT CURRENT_DATE")
            .fetch_one(&pool)
            .await
            .unwrap();

        let page = expenses_for_month(
            &pool,
            YearMonth::of(today),
            Some(Category::RestaurantsDelivery),
            Pagination::new(Some(1), Some(1)),
        )
        .await
        .unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].category, Category::RestaurantsDelivery);
    }
}
