//! Total amount extraction for receipts.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::lines::LineSet;
use super::patterns::{DECIMAL_NUMBER, NUMBER, TOTAL_LABEL};
use super::{ExtractionMatch, FieldExtractor};

/// Smallest amount the unlabeled fallback accepts as a total.
const MIN_PLAUSIBLE_TOTAL: Decimal = Decimal::ONE;

/// Largest amount the unlabeled fallback accepts as a total.
const MAX_PLAUSIBLE_TOTAL: Decimal = Decimal::ONE_THOUSAND;

/// Amount field extractor.
///
/// A number on a labeled line (`TOTAL`, `Amount`, `Balance`, ...) wins and is
/// returned verbatim. Without one, the largest plausible decimal figure on
/// the receipt is taken instead.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Last number on the first labeled line that has one.
    pub fn labeled_total(&self, lines: &LineSet) -> Option<ExtractionMatch<String>> {
        lines.iter().enumerate().find_map(|(index, line)| {
            if !TOTAL_LABEL.is_match(line) {
                return None;
            }

            NUMBER.find_iter(line).last().map(|m| {
                ExtractionMatch::new(m.as_str().to_string(), 0.95, line).with_line(index)
            })
        })
    }

    /// Largest decimal figure in `[1, 1000]` anywhere on the receipt.
    pub fn largest_plausible(&self, lines: &LineSet) -> Option<ExtractionMatch<Decimal>> {
        let mut best: Option<ExtractionMatch<Decimal>> = None;

        for (index, line) in lines.iter().enumerate() {
            for m in DECIMAL_NUMBER.find_iter(line) {
                let Some(amount) = parse_amount(m.as_str()) else {
                    continue;
                };

                if amount < MIN_PLAUSIBLE_TOTAL || amount > MAX_PLAUSIBLE_TOTAL {
                    continue;
                }

                if best.as_ref().is_none_or(|b| amount > b.value) {
                    best = Some(ExtractionMatch::new(amount, 0.6, line).with_line(index));
                }
            }
        }

        best
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = String;

    fn extract(&self, lines: &LineSet) -> Option<ExtractionMatch<String>> {
        self.labeled_total(lines)
            .or_else(|| self.largest_plausible(lines).map(|m| m.map(format_amount)))
    }
}

/// Extract the receipt total as text, or an empty string.
pub fn extract_total(lines: &LineSet) -> String {
    AmountExtractor::new()
        .extract(lines)
        .map(|m| m.value)
        .unwrap_or_default()
}

/// Parse an amount, treating commas as thousands separators ("1,234.56").
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&cleaned).ok()
}

/// Format an amount with exactly two decimal places, rounding half away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}
