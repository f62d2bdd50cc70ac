//! Date extraction for receipts.

use super::lines::LineSet;
use super::patterns::DATE;
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor.
///
/// Returns the first date-shaped token as written on the receipt. Day and
/// month values are not range-checked and the token is not reformatted.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = String;

    fn extract(&self, lines: &LineSet) -> Option<ExtractionMatch<String>> {
        lines.iter().enumerate().find_map(|(index, line)| {
            DATE.find(line).map(|m| {
                ExtractionMatch::new(m.as_str().to_string(), 0.9, line).with_line(index)
            })
        })
    }
}

/// Extract the first date token, or an empty string.
pub fn extract_date(lines: &LineSet) -> String {
    DateExtractor::new()
        .extract(lines)
        .map(|m| m.value)
        .unwrap_or_default()
}
