//! Expense categories.
//!
//! The set is fixed and mirrored by the seeded `category` table, so the
//! numeric id is what gets stored in `expense.category_id`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Groceries,
    Utilities,
    PersonalCare,
    RestaurantsDelivery,
    Transportation,
    #[default]
    Other,
    ClothesShoes,
    Household,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Groceries,
        Category::Utilities,
        Category::PersonalCare,
        Category::RestaurantsDelivery,
        Category::Transportation,
        Category::Other,
        Category::ClothesShoes,
        Category::Household,
    ];

    pub fn id(self) -> i32 {
        match self {
            Category::Groceries => 1,
            Category::Utilities => 2,
            Category::PersonalCare => 3,
            Category::RestaurantsDelivery => 4,
            Category::Transportation => 5,
            Category::Other => 6,
            Category::ClothesShoes => 7,
            Category::Household => 8,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Category::Groceries => "groceries",
            Category::Utilities => "utilities",
            Category::PersonalCare => "personal-care",
            Category::RestaurantsDelivery => "restaurants-delivery",
            Category::Transportation => "transportation",
            Category::Other => "other",
            Category::ClothesShoes => "clothes-shoes",
            Category::Household => "household",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Groceries => "Groceries",
            Category::Utilities => "Utilities",
            Category::PersonalCare => "Personal Care",
            Category::RestaurantsDelivery => "Restaurants & Delivery",
            Category::Transportation => "Transportation",
            Category::Other => "Other",
            Category::ClothesShoes => "Clothes & Shoes",
            Category::Household => "Household",
        }
    }

    /// Short code typed in quick-entry bot messages.
    pub fn code(self) -> &'static str {
        match self {
            Category::Groceries => "g",
            Category::Utilities => "u",
            Category::PersonalCare => "pc",
            Category::RestaurantsDelivery => "rd",
            Category::Transportation => "t",
            Category::Other => "o",
            Category::ClothesShoes => "cs",
            Category::Household => "h",
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Like [`Category::from_id`] but unknown ids land in [`Category::Other`].
    pub fn from_id_or_other(id: i32) -> Self {
        Self::from_id(id).unwrap_or(Category::Other)
    }
}
