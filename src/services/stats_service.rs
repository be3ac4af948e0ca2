//! Spending aggregates for the dashboard.
//!
//! `SUM(BIGINT)` is `NUMERIC` in PostgreSQL, so every sum is cast back to
//! `BIGINT` before it is decoded into `i64`.

use chrono::NaiveDate;

use crate::{
    db::DbPool,
    error::AppError,
    models::stats::{
        CategoryTotal, CategoryTotalRow, MonthlyCategoryTotal, MonthlyCategoryTotalRow,
        MonthsWindow, SpendingSummary, YearMonth,
    },
};

async fn spent_between(pool: &DbPool, from: NaiveDate, until: NaiveDate) -> Result<i64, AppError> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM expense
         WHERE expense_date >= $1 AND expense_date < $2",
    )
    .bind(from)
    .bind(until)
    .fetch_one(pool)
    .await?;

    Ok(total)
}

/// Spent on `date` and in the month containing it.
pub async fn summary(pool: &DbPool, date: NaiveDate) -> Result<SpendingSummary, AppError> {
    let next_day = date.succ_opt().unwrap_or(NaiveDate::MAX);
    let month = YearMonth::of(date);

    let (spent_today, spent_this_month) = tokio::try_join!(
        spent_between(pool, date, next_day),
        spent_between(pool, month.first_day(), month.next_first_day()),
    )?;

    Ok(SpendingSummary {
        date,
        spent_today,
        spent_this_month,
    })
}

/// Totals per category for one month, largest first.
pub async fn monthly_totals_by_category(
    pool: &DbPool,
    month: YearMonth,
) -> Result<Vec<CategoryTotal>, AppError> {
    let rows = sqlx::query_as::<_, CategoryTotalRow>(
        "SELECT category_id, SUM(amount)::BIGINT AS total
         FROM expense
         WHERE expense_date >= $1 AND expense_date < $2
         GROUP BY category_id
         ORDER BY total DESC",
    )
    .bind(month.first_day())
    .bind(month.next_first_day())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Totals per month and category over a window ending with the current month.
pub async fn totals_by_month_and_category(
    pool: &DbPool,
    window: MonthsWindow,
    today: NaiveDate,
) -> Result<Vec<MonthlyCategoryTotal>, AppError> {
    let rows = sqlx::query_as::<_, MonthlyCategoryTotalRow>(
        "SELECT EXTRACT(YEAR FROM expense_date)::INT AS year,
                EXTRACT(MONTH FROM expense_date)::INT AS month,
                category_id,
                SUM(amount)::BIGINT AS total
         FROM expense
         WHERE ($1::DATE IS NULL OR expense_date >= $1)
         GROUP BY year, month, category_id
         ORDER BY year, month, total DESC",
    )
    .bind(window.start(today))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}
