//! In-memory list of saved receipts with per-category totals.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::receipt::ExtractedReceipt;
use crate::receipt::rules::parse_amount;

/// A receipt the user chose to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedReceipt {
    pub receipt: ExtractedReceipt,
    pub saved_at: DateTime<Utc>,
}

/// Ordered collection of saved receipts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptLedger {
    entries: Vec<SavedReceipt>,
}

impl ReceiptLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a receipt, stamped with the current time.
    pub fn save(&mut self, receipt: ExtractedReceipt) -> &SavedReceipt {
        self.entries.push(SavedReceipt {
            receipt,
            saved_at: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Saved receipts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SavedReceipt> {
        self.entries.iter()
    }

    /// Remove the receipt at `index`.
    pub fn remove(&mut self, index: usize) -> Option<SavedReceipt> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Sum of totals per category label. Unparseable totals count as zero.
    pub fn category_totals(&self) -> BTreeMap<String, Decimal> {
        let mut totals = BTreeMap::new();

        for entry in &self.entries {
            *totals
                .entry(entry.receipt.category.clone())
                .or_insert(Decimal::ZERO) += parse_total_lenient(&entry.receipt.total);
        }

        totals
    }

    /// Sum of all totals. Unparseable totals count as zero.
    pub fn grand_total(&self) -> Decimal {
        self.entries
            .iter()
            .map(|e| parse_total_lenient(&e.receipt.total))
            .sum()
    }
}

/// Parse a total for arithmetic, returning zero when it is not a number.
///
/// Currency symbols and whitespace are ignored, so `"$ 1,234.50"` parses.
pub fn parse_total_lenient(total: &str) -> Decimal {
    let cleaned: String = total
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    parse_amount(&cleaned).unwrap_or(Decimal::ZERO)
}
