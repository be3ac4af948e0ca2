//! Receipt extraction: what we ask the model for, and how its answer is
//! checked before anything touches the database.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, de};
use serde_json::json;

use crate::models::{category::Category, vendor::Vendor};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("model response is not a valid receipt: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("items sum {items_sum} does not match receipt total {total}")]
    SumMismatch { items_sum: i64, total: i64 },

    #[error("items sum overflows, receipt total is {total}")]
    SumOverflow { total: i64 },
}

/// Structured receipt as returned by the model.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedReceipt {
    /// Total in cents
    #[serde(deserialize_with = "whole_cents")]
    pub total_price: i64,

    pub date: NaiveDate,

    pub items_list: Vec<ParsedItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedItem {
    pub name: String,

    /// Price in cents; discount lines may come back negative
    #[serde(deserialize_with = "whole_cents")]
    pub price: i64,

    #[serde(deserialize_with = "category_number")]
    pub category: Category,
}

/// JSON numbers from the model may be floats (`228.0`); anything with a
/// fractional part means it answered in euros and the receipt is rejected.
fn whole_cents<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = f64::deserialize(deserializer)?;

    if !value.is_finite() || value.fract() != 0.0 || value.abs() >= i64::MAX as f64 {
        return Err(de::Error::custom(format!(
            "expected a whole number of cents, got {value}"
        )));
    }

    Ok(value as i64)
}

fn category_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Category, D::Error> {
    let value = f64::deserialize(deserializer)?;
    Ok(Category::from_id_or_other(value as i32))
}

/// Instructions sent alongside the PDF.
pub fn build_prompt(vendor: Option<Vendor>) -> String {
    let discounts = if vendor == Some(Vendor::Continente) {
        "Ignore Discounts: Do not include discounts, coupons, or price deductions as separate line items. Extract only the standard price of the items.\n"
    } else {
        ""
    };

    format!(
        "Role: Act as an expert data extraction assistant specialized in retail receipts.\n\
         Task: Analyze the provided PDF receipt and extract the following information into a structured format.\n\
         Rules for Extraction:\n\
         Item List: List every purchased item.\n\
         {discounts}\
         Naming: Translate the item name to Russian. Include the original Portuguese name in parentheses immediately after (e.g., \"Яблоки (Maçãs)\").\n\
         Categorization: Assign one of these categories to each item (put category number to the response):\n\
         Groceries (category number is {groceries}): Anything edible or drinkable.\n\
         Personal Care (category number is {personal_care}): Hygiene (creams, toothbrushes, toothpaste, soap, etc.).\n\
         Household (category number is {household}): Household items (home furnishing & electronics, rags, detergents, dishwasher detergents, etc.).\n\
         Other (category number is {other}): Category for the rest items.\n\
         Pricing (In Cents): Provide the price of each individual item and the Total Price strictly in cents (e.g., a price of 2.28 must be converted to 228).\n\
         Metadata: Extract the Date from the receipt in YYYY-MM-DD format and the Total Price in cents.\n",
        groceries = Category::Groceries.id(),
        personal_care = Category::PersonalCare.id(),
        household = Category::Household.id(),
        other = Category::Other.id(),
    )
}

/// Gemini response schema for [`ParsedReceipt`].
pub fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "date": { "type": "STRING" },
            "totalPrice": { "type": "NUMBER" },
            "itemsList": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "price": { "type": "NUMBER" },
                        "category": { "type": "NUMBER" }
                    },
                    "required": ["name", "price", "category"]
                }
            }
        },
        "required": ["date", "totalPrice", "itemsList"]
    })
}

/// Parse the model's text, tolerating Markdown code fences around the JSON.
pub fn parse_response(text: &str) -> Result<ParsedReceipt, IngestError> {
    let cleaned = lazy_regex::regex_replace_all!(r"```json\n|```", text.trim(), "");
    Ok(serde_json::from_str(cleaned.trim())?)
}

/// Sum of the positive item prices, `None` on overflow.
///
/// Negative lines are discounts already reflected in the printed item
/// prices, so they do not count towards the total.
pub fn items_sum(items: &[ParsedItem]) -> Option<i64> {
    items
        .iter()
        .map(|i| i.price)
        .filter(|p| *p > 0)
        .try_fold(0i64, i64::checked_add)
}

/// The extraction is trusted only if its items add up to the printed total.
pub fn validate_totals(receipt: &ParsedReceipt) -> Result<(), IngestError> {
    let items_sum = items_sum(&receipt.items_list).ok_or(IngestError::SumOverflow {
        total: receipt.total_price,
    })?;

    if items_sum != receipt.total_price {
        return Err(IngestError::SumMismatch {
            items_sum,
            total: receipt.total_price,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "date": "2025-03-01",
        "totalPrice": 417,
        "itemsList": [
            { "name": "Молоко (Leite)", "price": 89, "category": 1 },
            { "name": "Мыло (Sabonete)", "price": 228.0, "category": 3 },
            { "name": "Desconto", "price": -50, "category": 6 },
            { "name": "Тряпка (Pano)", "price": 100, "category": 8 }
        ]
    }"#;

    #[test]
    fn parses_model_response() {
        let receipt = parse_response(RESPONSE).unwrap();

        assert_eq!(receipt.total_price, 417);
        assert_eq!(receipt.date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(receipt.items_list.len(), 4);
        assert_eq!(receipt.items_list[1].price, 228);
        assert_eq!(receipt.items_list[1].category, Category::PersonalCare);
        assert_eq!(receipt.items_list[3].category, Category::Household);
    }

    #[test]
    fn strips_code_fences() {
        let fenced = format!("```json\n{RESPONSE}\n```");
        assert_eq!(parse_response(&fenced).unwrap().total_price, 417);
    }

    #[test]
    fn rejects_fractional_cents() {
        let text = r#"{ "date": "2025-03-01", "totalPrice": 2.28, "itemsList": [] }"#;
        assert!(matches!(parse_response(text), Err(IngestError::Parse(_))));
    }

    #[test]
    fn rejects_bad_date() {
        let text = r#"{ "date": "01/03/2025", "totalPrice": 0, "itemsList": [] }"#;
        assert!(parse_response(text).is_err());
    }

    #[test]
    fn unknown_category_number_is_other() {
        let text = r#"{ "date": "2025-03-01", "totalPrice": 5,
            "itemsList": [{ "name": "x", "price": 5, "category": 99 }] }"#;
        assert_eq!(
            parse_response(text).unwrap().items_list[0].category,
            Category::Other
        );
    }

    #[test]
    fn sum_ignores_non_positive_items() {
        let receipt = parse_response(RESPONSE).unwrap();

        assert_eq!(items_sum(&receipt.items_list), Some(417));
        assert!(validate_totals(&receipt).is_ok());
    }

    #[test]
    fn mismatched_total_is_rejected() {
        let mut receipt = parse_response(RESPONSE).unwrap();
        receipt.total_price = 367;

        match validate_totals(&receipt) {
            Err(IngestError::SumMismatch { items_sum, total }) => {
                assert_eq!(items_sum, 417);
                assert_eq!(total, 367);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn overflowing_items_fail_the_check() {
        let text = r#"{ "date": "2025-03-01", "totalPrice": 100,
            "itemsList": [
                { "name": "a", "price": 5000000000000000000, "category": 1 },
                { "name": "b", "price": 5000000000000000000, "category": 1 }
            ] }"#;
        let receipt = parse_response(text).unwrap();

        assert_eq!(items_sum(&receipt.items_list), None);
        assert!(matches!(
            validate_totals(&receipt),
            Err(IngestError::SumOverflow { total: 100 })
        ));
    }

    #[test]
    fn rejects_cents_beyond_i64() {
        let text = r#"{ "date": "2025-03-01", "totalPrice": 9223372036854775808, "itemsList": [] }"#;
        assert!(matches!(parse_response(text), Err(IngestError::Parse(_))));
    }

    #[test]
    fn prompt_mentions_discounts_only_for_continente() {
        assert!(build_prompt(Some(Vendor::Continente)).contains("Ignore Discounts"));
        assert!(!build_prompt(Some(Vendor::PingoDoce)).contains("Ignore Discounts"));
        assert!(!build_prompt(None).contains("Ignore Discounts"));
        assert!(build_prompt(None).contains("category number is 8"));
    }
}
