//! Core library for receipt OCR processing.
//!
//! This crate provides:
//! - Field extraction from raw OCR text (merchant, date, total)
//! - Keyword-based spending categorization
//! - Optional remote classification that overrides the keyword category
//! - An in-memory ledger of saved receipts with per-category totals

pub mod categorize;
pub mod error;
pub mod ledger;
pub mod models;
pub mod receipt;

pub use categorize::{CategoryResolution, CategoryResolver, OllamaCategorizer, RemoteCategorizer};
pub use error::{RcptError, RemoteError, Result};
pub use ledger::{parse_total_lenient, ReceiptLedger, SavedReceipt};
pub use models::config::RcptConfig;
pub use models::receipt::{CategoryLabel, ExtractedReceipt};
pub use receipt::rules::{LineSet, RuleCategorizer};
pub use receipt::{ExtractionResult, ReceiptExtractor, TextSource};
