//! Common regex patterns for receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Lines that carry the amount to pay
    pub static ref TOTAL_LABEL: Regex = Regex::new(
        r"(?i)grand\s+total|subtotal|total|amount|balance"
    ).unwrap();

    // Any number, optionally with grouping/decimal separators: 12, 12.50, 1,234.56
    pub static ref NUMBER: Regex = Regex::new(
        r"\d+(?:[.,]\d+)*"
    ).unwrap();

    // Numbers with at least one separator: 4.00, 1,234.56 (bare integers excluded)
    pub static ref DECIMAL_NUMBER: Regex = Regex::new(
        r"\d+(?:[.,]\d+)+"
    ).unwrap();

    // D/M/YY(YY) or YYYY/M/D, with "/" or "-" in either position
    pub static ref DATE: Regex = Regex::new(
        r"\d{1,2}[/-]\d{1,2}[/-](?:\d{4}|\d{2})|\d{4}[/-]\d{1,2}[/-]\d{1,2}"
    ).unwrap();
}
