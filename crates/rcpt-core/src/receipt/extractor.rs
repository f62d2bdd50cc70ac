//! Extraction orchestrator: normalize once, run the field rules, resolve
//! the category.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::categorize::{CategoryResolution, CategoryResolver, OllamaCategorizer};
use crate::error::Result;
use crate::models::config::RcptConfig;
use crate::models::receipt::{CategoryLabel, ExtractedReceipt};

use super::TextSource;
use super::rules::{extract_date, extract_merchant, extract_total, normalize, RuleCategorizer};

/// Result of one extraction with diagnostics.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted receipt fields.
    pub receipt: ExtractedReceipt,
    /// How the category was decided.
    pub category: CategoryResolution,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Turns raw OCR text into an [`ExtractedReceipt`].
///
/// Holds no per-call state; one instance can serve concurrent extractions.
/// None of the extraction methods return errors: missing fields come back as
/// empty strings and the category falls back to the keyword rules.
#[derive(Clone, Default)]
pub struct ReceiptExtractor {
    resolver: CategoryResolver,
}

impl ReceiptExtractor {
    /// Create an extractor with an explicit category resolver.
    pub fn new(resolver: CategoryResolver) -> Self {
        Self { resolver }
    }

    /// Build the keyword rules and, if enabled, the remote classifier.
    pub fn from_config(config: &RcptConfig) -> Result<Self> {
        config.validate()?;

        let mut resolver = CategoryResolver::new(RuleCategorizer::new(&config.categories)?);
        if config.remote.enabled {
            let remote = OllamaCategorizer::new(&config.remote)?;
            info!("Remote categorizer enabled: {} at {}", config.remote.model, remote.endpoint());
            resolver = resolver.with_remote(Arc::new(remote));
        }

        Ok(Self::new(resolver))
    }

    /// Extract all fields, consulting the remote classifier when configured.
    pub async fn extract(&self, raw: &str) -> ExtractedReceipt {
        self.extract_detailed(raw).await.receipt
    }

    /// Like [`extract`](Self::extract), with the category decision and warnings.
    pub async fn extract_detailed(&self, raw: &str) -> ExtractionResult {
        let start = Instant::now();
        info!("Extracting receipt from {} characters of text", raw.len());

        let (merchant, date, total) = extract_fields(raw);
        let category = self.resolver.resolve(&merchant, raw).await;

        finish(merchant, date, total, category, start)
    }

    /// Extract all fields using the keyword rules only.
    pub fn extract_local(&self, raw: &str) -> ExtractedReceipt {
        let start = Instant::now();

        let (merchant, date, total) = extract_fields(raw);
        let rule = self.resolver.rule_label(&merchant, raw);
        let category = CategoryResolution::start(rule, false);

        finish(merchant, date, total, category, start).receipt
    }

    /// Pull text from the OCR stage, then extract.
    ///
    /// If the source fails there is nothing to extract from, and the default
    /// record (all fields empty, category `Other`) is returned.
    pub async fn extract_from_source(&self, source: &dyn TextSource) -> ExtractedReceipt {
        self.extract_from_source_detailed(source).await.receipt
    }

    /// Like [`extract_from_source`](Self::extract_from_source), with diagnostics.
    ///
    /// Neither stage runs when the source fails, so the remote classifier is
    /// never asked about missing text.
    pub async fn extract_from_source_detailed(&self, source: &dyn TextSource) -> ExtractionResult {
        let start = Instant::now();

        match source.read_text() {
            Ok(text) => self.extract_detailed(&text).await,
            Err(e) => {
                warn!("OCR text unavailable, returning empty receipt: {}", e);
                ExtractionResult {
                    receipt: ExtractedReceipt::default(),
                    category: CategoryResolution::start(CategoryLabel::Other, false),
                    warnings: vec![format!("OCR text unavailable: {}", e)],
                    processing_time_ms: start.elapsed().as_millis() as u64,
                }
            }
        }
    }

    /// Whether a remote classifier is configured.
    pub fn has_remote(&self) -> bool {
        self.resolver.has_remote()
    }
}

fn extract_fields(raw: &str) -> (String, String, String) {
    let lines = normalize(raw);
    debug!("Normalized OCR text into {} lines", lines.len());

    let merchant = extract_merchant(&lines);
    let date = extract_date(&lines);
    let total = extract_total(&lines);

    debug!("Fields: merchant={:?} date={:?} total={:?}", merchant, date, total);
    (merchant, date, total)
}

fn finish(
    merchant: String,
    date: String,
    total: String,
    category: CategoryResolution,
    start: Instant,
) -> ExtractionResult {
    let receipt = ExtractedReceipt::new(merchant, date, total, category.label());

    let mut warnings: Vec<String> = receipt
        .missing_fields()
        .into_iter()
        .map(|field| format!("Could not extract {}", field))
        .collect();
    if let CategoryResolution::RemoteFailed { reason, .. } = &category {
        warnings.push(format!("Remote categorizer failed: {}", reason));
    }

    ExtractionResult {
        receipt,
        category,
        warnings,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorize::testing::FixedRemote;
    use crate::error::RcptError;
    use pretty_assertions::assert_eq;

    const DINER: &str = r#"
        Joe's Diner
        Store #42

        03/14/2024  12:31
        Burger          9.00
        Coffee          3.50
        TOTAL          12.50
        VISA ****1234
    "#;

    struct FailingSource;

    impl TextSource for FailingSource {
        fn read_text(&self) -> Result<String> {
            Err(RcptError::Upstream("camera unavailable".to_string()))
        }
    }

    #[test]
    fn test_extract_local() {
        let receipt = ReceiptExtractor::default().extract_local(DINER);

        assert_eq!(
            receipt,
            ExtractedReceipt::new("Joe's Diner Store #42", "03/14/2024", "12.50", "Food & Drink")
        );
    }

    #[tokio::test]
    async fn test_empty_text() {
        let receipt = ReceiptExtractor::default().extract("").await;
        assert_eq!(receipt, ExtractedReceipt::default());
        assert_eq!(receipt.category, "Other");
    }

    #[tokio::test]
    async fn test_category_never_empty() {
        let extractor = ReceiptExtractor::default();
        for text in ["", "   \n  ", "???", "TOTAL", DINER] {
            assert!(!extractor.extract(text).await.category.is_empty());
        }

        let with_blank_remote =
            ReceiptExtractor::new(CategoryResolver::default().with_remote(FixedRemote::answering(" ")));
        assert_eq!(with_blank_remote.extract("").await.category, "Other");
    }

    #[tokio::test]
    async fn test_remote_failure_uses_rule_category() {
        let extractor = ReceiptExtractor::new(
            CategoryResolver::default().with_remote(FixedRemote::failing("network down")),
        );

        let result = extractor.extract_detailed(DINER).await;
        let rule = RuleCategorizer::default().categorize("Joe's Diner Store #42", DINER);

        assert_eq!(result.receipt.category, rule.as_str());
        assert_eq!(rule, CategoryLabel::FoodAndDrink);
        assert!(result.warnings.iter().any(|w| w.contains("network down")));
    }

    #[tokio::test]
    async fn test_remote_success_overrides() {
        let extractor =
            ReceiptExtractor::new(CategoryResolver::default().with_remote(FixedRemote::answering("Travel")));

        let result = extractor.extract_detailed(DINER).await;
        assert_eq!(result.receipt.category, "Travel");
        assert!(result.category.is_remote());
        assert_eq!(result.category.rule(), CategoryLabel::FoodAndDrink);
    }

    #[tokio::test]
    async fn test_idempotent() {
        let extractor =
            ReceiptExtractor::new(CategoryResolver::default().with_remote(FixedRemote::answering("Health")));

        let first = extractor.extract(DINER).await;
        let second = extractor.extract(DINER).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failing_source_degrades_to_default() {
        let extractor = ReceiptExtractor::default();
        let receipt = extractor.extract_from_source(&FailingSource).await;

        assert_eq!(receipt, ExtractedReceipt::default());
    }

    #[tokio::test]
    async fn test_failing_source_skips_remote() {
        let extractor = ReceiptExtractor::new(
            CategoryResolver::default().with_remote(FixedRemote::answering("Shopping")),
        );
        let result = extractor.extract_from_source_detailed(&FailingSource).await;

        assert_eq!(result.receipt, ExtractedReceipt::default());
        assert_eq!(result.category, CategoryResolution::RuleOnly { rule: CategoryLabel::Other });
        assert_eq!(result.warnings, vec!["OCR text unavailable: upstream OCR error: camera unavailable".to_string()]);
    }

    #[tokio::test]
    async fn test_string_source() {
        let extractor = ReceiptExtractor::default();
        let receipt = extractor.extract_from_source(&"Shell\nFuel 40.00").await;

        assert_eq!(receipt.merchant, "Shell Fuel 40.00");
        assert_eq!(receipt.total, "40.00");
        assert_eq!(receipt.category, "Gas/Transport");
    }

    #[tokio::test]
    async fn test_missing_field_warnings() {
        let result = ReceiptExtractor::default().extract_detailed("Corner Store").await;

        assert_eq!(
            result.warnings,
            vec!["Could not extract date".to_string(), "Could not extract total".to_string()]
        );
    }

    #[test]
    fn test_from_config_without_remote() {
        let mut config = RcptConfig::default();
        config.remote.enabled = false;

        let extractor = ReceiptExtractor::from_config(&config).unwrap();
        assert!(!extractor.has_remote());
    }

    #[test]
    fn test_from_config_with_remote() {
        let extractor = ReceiptExtractor::from_config(&RcptConfig::default()).unwrap();
        assert!(extractor.has_remote());
    }
}
