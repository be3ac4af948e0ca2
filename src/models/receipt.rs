//! Receipt data models and API request/response types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::vendor::Vendor;

/// Represents a receipt record from the database.
///
/// # Database Table
///
/// Maps to the `receipt` table. Line items live in `expense` rows pointing
/// back at `receipt_id`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Receipt {
    pub receipt_id: i32,

    /// 1 = Continente, 2 = Pingo Doce, 3 = Other; NULL when unknown
    pub vendor: Option<i32>,

    pub user_id: i32,

    /// Total in cents as printed on the receipt
    pub amount: Option<i64>,

    pub receipt_date: NaiveDate,

    pub created_at: DateTime<Utc>,
}

/// Response body for receipt endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "receipt_id": 4,
///   "vendor": { "id": 1, "name": "Continente" },
///   "total_amount": 4523,
///   "receipt_date": "2025-03-01",
///   "user_id": 1,
///   "created_at": "2025-03-01T18:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub receipt_id: i32,
    pub vendor: Option<Vendor>,
    pub total_amount: Option<i64>,
    pub receipt_date: NaiveDate,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Receipt> for ReceiptResponse {
    fn from(receipt: Receipt) -> Self {
        Self {
            receipt_id: receipt.receipt_id,
            vendor: receipt.vendor.and_then(Vendor::from_id),
            total_amount: receipt.amount,
            receipt_date: receipt.receipt_date,
            user_id: receipt.user_id,
            created_at: receipt.created_at,
        }
    }
}

/// Request body for `PUT /api/v1/receipts/{id}`.
///
/// ```json
/// { "receipt_date": "2025-03-01", "total_amount": 4523 }
/// ```
#[derive(Debug, Deserialize)]
pub struct UpdateReceiptRequest {
    pub receipt_date: NaiveDate,

    /// `null` clears the stored total
    pub total_amount: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Query string for `GET /api/v1/receipts`.
#[derive(Debug, Deserialize)]
pub struct ReceiptListQuery {
    pub page: Option<i64>,

    pub page_size: Option<i64>,

    /// Order by receipt date, newest first unless `asc`
    #[serde(default)]
    pub sort_order: SortOrder,
}
