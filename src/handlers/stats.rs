//! Spending statistics handlers.
//!
//! - GET /api/v1/stats/summary - Spent today and this month
//! - GET /api/v1/stats/monthly - Category totals for a month
//! - GET /api/v1/stats/trends - Category totals per month over a window

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Local;

use crate::{
    db::DbPool,
    error::AppError,
    models::stats::{
        CategoryTotal, MonthlyCategoryTotal, MonthlyStatsQuery, MonthsWindow, SpendingSummary,
        SummaryQuery, TrendsQuery, YearMonth,
    },
    services::stats_service,
};

/// # Response (200 OK)
///
/// ```json
/// { "date": "2025-03-02", "spent_today": 1240, "spent_this_month": 18320 }
/// ```
pub async fn summary(
    State(pool): State<DbPool>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SpendingSummary>, AppError> {
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());

    Ok(Json(stats_service::summary(&pool, date).await?))
}

/// Category totals for `month` (`MM-yyyy`); a missing or invalid month
/// means the current one.
pub async fn monthly(
    State(pool): State<DbPool>,
    Query(query): Query<MonthlyStatsQuery>,
) -> Result<Json<Vec<CategoryTotal>>, AppError> {
    let month = YearMonth::from_query(query.month.as_deref(), Local::now().date_naive());

    Ok(Json(
        stats_service::monthly_totals_by_category(&pool, month).await?,
    ))
}

/// Per-month category totals for the last `months` months (default 3,
/// `all` for everything).
pub async fn trends(
    State(pool): State<DbPool>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<Vec<MonthlyCategoryTotal>>, AppError> {
    let window = MonthsWindow::from_query(query.months.as_deref());

    Ok(Json(
        stats_service::totals_by_month_and_category(&pool, window, Local::now().date_naive())
            .await?,
    ))
}
