//! Rule-based field extractors for receipts.

pub mod amounts;
pub mod category;
pub mod dates;
pub mod lines;
pub mod merchant;
pub mod patterns;

pub use amounts::{extract_total, format_amount, parse_amount, AmountExtractor};
pub use category::RuleCategorizer;
pub use dates::{extract_date, DateExtractor};
pub use lines::{normalize, LineSet};
pub use merchant::{extract_merchant, MerchantExtractor};
pub use patterns::*;

/// Trait for field extractors working on a normalized line set.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field, or `None` when nothing qualifies.
    fn extract(&self, lines: &LineSet) -> Option<ExtractionMatch<Self::Output>>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Index of the line the value came from.
    pub line: Option<usize>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            line: None,
            source: source.into(),
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Transform the value, keeping the match context.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractionMatch<U> {
        ExtractionMatch {
            value: f(self.value),
            confidence: self.confidence,
            line: self.line,
            source: self.source,
        }
    }
}
