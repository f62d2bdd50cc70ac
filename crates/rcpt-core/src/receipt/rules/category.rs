//! Keyword-based spending categorization.

use regex::Regex;
use tracing::debug;

use crate::error::{RcptError, Result};
use crate::models::config::{CategoryConfig, CategoryRule};
use crate::models::receipt::CategoryLabel;

/// A rule compiled into a single alternation pattern.
#[derive(Debug, Clone)]
struct CompiledRule {
    label: CategoryLabel,
    pattern: Regex,
}

/// Deterministic keyword classifier.
///
/// Rules are tested in table order and the first one with a keyword anywhere
/// in the merchant or receipt text decides the label. Priority comes from the
/// order alone, not from how specific a keyword is.
#[derive(Debug, Clone)]
pub struct RuleCategorizer {
    rules: Vec<CompiledRule>,
}

impl RuleCategorizer {
    /// Compile a rule table.
    pub fn new(config: &CategoryConfig) -> Result<Self> {
        let rules = config
            .rules
            .iter()
            .map(compile_rule)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Label for the given merchant and full receipt text.
    pub fn categorize(&self, merchant: &str, text: &str) -> CategoryLabel {
        let haystack = format!("{} {}", merchant, text).to_lowercase();

        let label = self
            .rules
            .iter()
            .find(|rule| rule.pattern.is_match(&haystack))
            .map(|rule| rule.label)
            .unwrap_or(CategoryLabel::Other);

        debug!("Rule-based category: {}", label);
        label
    }

    /// Number of compiled rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleCategorizer {
    fn default() -> Self {
        Self::new(&CategoryConfig::default()).expect("default category table compiles")
    }
}

fn compile_rule(rule: &CategoryRule) -> Result<CompiledRule> {
    let alternation = rule
        .keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .map(|k| regex::escape(&k))
        .collect::<Vec<_>>()
        .join("|");

    if alternation.is_empty() {
        return Err(RcptError::Config(format!(
            "category rule {} has no keywords",
            rule.label
        )));
    }

    let pattern = Regex::new(&alternation).map_err(|e| {
        RcptError::Config(format!("invalid keywords for {}: {}", rule.label, e))
    })?;

    Ok(CompiledRule {
        label: rule.label,
        pattern,
    })
}
