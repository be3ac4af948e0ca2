//! Quick expense entry from a bot text message.
//!
//! Accepted forms:
//!
//! ```text
//! Coffee          <- name
//! 1,20            <- amount, "," or "." as decimal separator
//! rd              <- category code (unknown codes mean "other")
//! ```
//!
//! or the metro shorthand `м2` (Cyrillic `м`/`М` and a single digit) for
//! that many metro rides.

use crate::models::category::Category;

/// Price of one metro ride in cents.
pub const METRO_FARE_CENTS: i64 = 140;

pub const METRO_EXPENSE_NAME: &str = "Метро";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickExpense {
    pub name: String,
    /// Amount in cents
    pub amount: i64,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuickEntryError {
    #[error("could not parse the message")]
    Unrecognized,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Parse a bot text message into an expense.
pub fn parse(text: &str) -> Result<QuickExpense, QuickEntryError> {
    let mut lines = text.split('\n').map(str::trim);

    let name = lines.next().unwrap_or_default();
    let amount = lines.next().filter(|l| !l.is_empty());
    let code = lines.next().filter(|l| !l.is_empty());

    match (amount, code) {
        (Some(amount), Some(code)) if !name.is_empty() => Ok(QuickExpense {
            name: name.to_string(),
            amount: parse_amount_cents(amount)?,
            category: Category::from_code(code).unwrap_or_default(),
        }),
        _ => parse_metro(name).ok_or(QuickEntryError::Unrecognized),
    }
}

fn parse_metro(name: &str) -> Option<QuickExpense> {
    let (_, rides) = lazy_regex::regex_captures!(r"^[мМ](\d)$", name)?;
    let rides: i64 = rides.parse().ok()?;

    Some(QuickExpense {
        name: METRO_EXPENSE_NAME.to_string(),
        amount: rides * METRO_FARE_CENTS,
        category: Category::Transportation,
    })
}

/// Convert a decimal amount in euros to cents, truncating extra decimals.
///
/// `"12,345"` is 1234 cents. Zero and negative amounts are rejected.
pub fn parse_amount_cents(raw: &str) -> Result<i64, QuickEntryError> {
    let invalid = || QuickEntryError::InvalidAmount(raw.to_string());

    let normalized = raw.trim().replace(',', ".");
    let (_, whole, fraction) =
        lazy_regex::regex_captures!(r"^(\d*)(?:\.(\d*))?$", &normalized).ok_or_else(invalid)?;

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };

    let cents: i64 = fraction
        .chars()
        .chain(std::iter::repeat('0'))
        .take(2)
        .collect::<String>()
        .parse()
        .map_err(|_| invalid())?;

    let amount = whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(cents))
        .ok_or_else(invalid)?;

    if amount <= 0 {
        return Err(invalid());
    }

    Ok(amount)
}
