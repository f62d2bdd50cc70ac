//! Merchant name extraction.

use super::lines::LineSet;
use super::{ExtractionMatch, FieldExtractor};

/// Second lines at least this long are treated as address blocks and left out.
const MAX_SUBLABEL_CHARS: usize = 30;

/// Merchant field extractor.
///
/// Receipts often split the name across the first two lines ("Joe's Diner" /
/// "Store #42"), so a short second line is appended to the first.
pub struct MerchantExtractor;

impl MerchantExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MerchantExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for MerchantExtractor {
    type Output = String;

    fn extract(&self, lines: &LineSet) -> Option<ExtractionMatch<String>> {
        let first = lines.get(0)?;

        let merchant = match lines.get(1) {
            Some(second) if second.chars().count() < MAX_SUBLABEL_CHARS => {
                format!("{} {}", first, second)
            }
            _ => first.to_string(),
        };

        Some(ExtractionMatch::new(merchant, 0.7, first).with_line(0))
    }
}

/// Extract the merchant label, or an empty string.
pub fn extract_merchant(lines: &LineSet) -> String {
    MerchantExtractor::new()
        .extract(lines)
        .map(|m| m.value)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_second_line_appended() {
        let lines: LineSet = ["Joe's Diner", "Store #42"].into_iter().collect();
        assert_eq!(extract_merchant(&lines), "Joe's Diner Store #42");
    }

    #[test]
    fn test_long_second_line_dropped() {
        let lines: LineSet = [
            "Joe's Diner",
            "123 Main St, Springfield, USA that is a long address line exceeding thirty chars",
        ]
        .into_iter()
        .collect();
        assert_eq!(extract_merchant(&lines), "Joe's Diner");
    }

    #[test]
    fn test_length_limit_is_exclusive() {
        let exactly_thirty = "x".repeat(30);
        let lines: LineSet = ["Shop", exactly_thirty.as_str()].into_iter().collect();
        assert_eq!(extract_merchant(&lines), "Shop");

        let twenty_nine = "x".repeat(29);
        let lines: LineSet = ["Shop", twenty_nine.as_str()].into_iter().collect();
        assert_eq!(extract_merchant(&lines), format!("Shop {}", twenty_nine));
    }

    #[test]
    fn test_single_and_empty() {
        let lines: LineSet = ["Corner Store"].into_iter().collect();
        assert_eq!(extract_merchant(&lines), "Corner Store");
        assert_eq!(extract_merchant(&LineSet::default()), "");
    }
}
