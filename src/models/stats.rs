//! Aggregated spending figures and the month/window parameters that select them.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::category::Category;

/// Trends show this many months when the query does not say otherwise.
pub const DEFAULT_TREND_MONTHS: u32 = 3;

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse `MM-yyyy` (single-digit months allowed).
    pub fn parse(value: &str) -> Option<Self> {
        let (_, month, year) = lazy_regex::regex_captures!(r"^(\d{1,2})-(\d{4})$", value.trim())?;

        let month: u32 = month.parse().ok()?;
        let year: i32 = year.parse().ok()?;

        // Rejects month 0 and 13+
        NaiveDate::from_ymd_opt(year, month, 1)?;

        Some(Self { year, month })
    }

    /// Parsed month from a query value, or the month of `today` when the
    /// value is missing or malformed.
    pub fn from_query(value: Option<&str>, today: NaiveDate) -> Self {
        value
            .and_then(Self::parse)
            .unwrap_or_else(|| Self::of(today))
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// First day of the following month, the exclusive upper bound.
    pub fn next_first_day(self) -> NaiveDate {
        self.first_day()
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX)
    }
}

/// How far back the trends view looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthsWindow {
    Last(u32),
    All,
}

impl MonthsWindow {
    /// `all`, a positive number, or anything else meaning the default.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("all") => MonthsWindow::All,
            Some(v) => match v.parse::<u32>() {
                Ok(n) if n > 0 => MonthsWindow::Last(n),
                _ => MonthsWindow::Last(DEFAULT_TREND_MONTHS),
            },
            None => MonthsWindow::Last(DEFAULT_TREND_MONTHS),
        }
    }

    /// First day included in the window; `None` means unbounded.
    ///
    /// The current month counts as one, so `Last(3)` on 2025-03-15 starts
    /// at 2025-01-01.
    pub fn start(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            MonthsWindow::All => None,
            MonthsWindow::Last(n) => {
                let current = YearMonth::of(today).first_day();
                Some(
                    current
                        .checked_sub_months(Months::new(n.saturating_sub(1)))
                        .unwrap_or(NaiveDate::MIN),
                )
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyStatsQuery {
    pub month: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    pub months: Option<String>,
}

/// Raw aggregate row: `SELECT category_id, SUM(amount)::BIGINT AS total`.
#[derive(Debug, sqlx::FromRow)]
pub struct CategoryTotalRow {
    pub category_id: i32,
    pub total: i64,
}

/// Raw aggregate row for the per-month breakdown.
#[derive(Debug, sqlx::FromRow)]
pub struct MonthlyCategoryTotalRow {
    pub year: i32,
    pub month: i32,
    pub category_id: i32,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub category_label: &'static str,
    pub total: i64,
}

impl From<CategoryTotalRow> for CategoryTotal {
    fn from(row: CategoryTotalRow) -> Self {
        let category = Category::from_id_or_other(row.category_id);
        Self {
            category,
            category_label: category.label(),
            total: row.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MonthlyCategoryTotal {
    pub year: i32,
    pub month: i32,
    pub category: Category,
    pub category_label: &'static str,
    pub total: i64,
}

impl From<MonthlyCategoryTotalRow> for MonthlyCategoryTotal {
    fn from(row: MonthlyCategoryTotalRow) -> Self {
        let category = Category::from_id_or_other(row.category_id);
        Self {
            year: row.year,
            month: row.month,
            category,
            category_label: category.label(),
            total: row.total,
        }
    }
}

/// Figures for the dashboard's headline cards.
#[derive(Debug, Serialize)]
pub struct SpendingSummary {
    pub date: NaiveDate,
    pub spent_today: i64,
    pub spent_this_month: i64,
}
