//! Receipt field extraction module.

mod extractor;
pub mod rules;

pub use extractor::{ExtractionResult, ReceiptExtractor};

use crate::error::Result;

/// Upstream producer of OCR text for one receipt.
///
/// Implemented by whatever runs OCR (or reads its output); the extractor only
/// needs the text.
pub trait TextSource {
    /// Produce the raw OCR text.
    fn read_text(&self) -> Result<String>;
}

impl TextSource for String {
    fn read_text(&self) -> Result<String> {
        Ok(self.clone())
    }
}

impl TextSource for &str {
    fn read_text(&self) -> Result<String> {
        Ok((*self).to_string())
    }
}
