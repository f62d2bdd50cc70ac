//! Receipt data models.

use serde::{Deserialize, Serialize};

/// Structured fields extracted from a single receipt.
///
/// Fields that could not be found are empty strings rather than `None`, so the
/// record can be displayed without further unwrapping. `category` is never
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ReceiptFields")]
pub struct ExtractedReceipt {
    /// Merchant label taken from the leading lines.
    pub merchant: String,

    /// First date-shaped token, kept verbatim.
    pub date: String,

    /// Total amount as text (thousands separators preserved).
    pub total: String,

    /// Spending category label.
    pub category: String,
}

impl ExtractedReceipt {
    /// Create a record, substituting `Other` for an empty category.
    pub fn new(
        merchant: impl Into<String>,
        date: impl Into<String>,
        total: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let category = category.into();
        let category = if category.trim().is_empty() {
            CategoryLabel::Other.as_str().to_string()
        } else {
            category
        };

        Self {
            merchant: merchant.into(),
            date: date.into(),
            total: total.into(),
            category,
        }
    }

    /// Names of the fields that were not found.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.merchant.is_empty() {
            missing.push("merchant");
        }
        if self.date.is_empty() {
            missing.push("date");
        }
        if self.total.is_empty() {
            missing.push("total");
        }

        missing
    }
}

/// Wire form of [`ExtractedReceipt`]; a blank or absent category becomes `Other`.
#[derive(Deserialize)]
struct ReceiptFields {
    merchant: String,
    date: String,
    total: String,
    #[serde(default)]
    category: String,
}

impl From<ReceiptFields> for ExtractedReceipt {
    fn from(fields: ReceiptFields) -> Self {
        Self::new(fields.merchant, fields.date, fields.total, fields.category)
    }
}

impl Default for ExtractedReceipt {
    fn default() -> Self {
        Self {
            merchant: String::new(),
            date: String::new(),
            total: String::new(),
            category: CategoryLabel::Other.as_str().to_string(),
        }
    }
}

/// Category labels produced by the keyword rules.
///
/// The remote classifier is free to answer with a differently worded label
/// (`Health`, `Gas`); those are stored as-is in [`ExtractedReceipt::category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryLabel {
    #[serde(rename = "Travel")]
    Travel,
    #[serde(rename = "Food & Drink")]
    FoodAndDrink,
    #[serde(rename = "Groceries")]
    Groceries,
    #[serde(rename = "Lodging")]
    Lodging,
    #[serde(rename = "Pharmacy/Health")]
    PharmacyHealth,
    #[serde(rename = "Shopping")]
    Shopping,
    #[serde(rename = "Gas/Transport")]
    GasTransport,
    #[serde(rename = "Utilities")]
    Utilities,
    #[serde(rename = "Other")]
    Other,
}

impl CategoryLabel {
    /// All labels, in default rule priority order (`Other` last).
    pub const ALL: [CategoryLabel; 9] = [
        CategoryLabel::Travel,
        CategoryLabel::FoodAndDrink,
        CategoryLabel::Groceries,
        CategoryLabel::Lodging,
        CategoryLabel::PharmacyHealth,
        CategoryLabel::Shopping,
        CategoryLabel::GasTransport,
        CategoryLabel::Utilities,
        CategoryLabel::Other,
    ];

    /// Display string of the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryLabel::Travel => "Travel",
            CategoryLabel::FoodAndDrink => "Food & Drink",
            CategoryLabel::Groceries => "Groceries",
            CategoryLabel::Lodging => "Lodging",
            CategoryLabel::PharmacyHealth => "Pharmacy/Health",
            CategoryLabel::Shopping => "Shopping",
            CategoryLabel::GasTransport => "Gas/Transport",
            CategoryLabel::Utilities => "Utilities",
            CategoryLabel::Other => "Other",
        }
    }

    /// Parse a label from its display string (case-insensitive).
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
