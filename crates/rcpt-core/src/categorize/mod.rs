//! Two-stage category resolution.
//!
//! The keyword rules always produce a label. When a remote classifier is
//! configured it is asked as well, and a non-empty answer replaces the rule
//! label. Any remote failure leaves the rule label in place.
//!
//! ```text
//! RuleOnly ──(remote configured)──▶ RemotePending ──ok──▶ RemoteResolved
//!                                         │
//!                                         └──err/empty──▶ RemoteFailed (uses rule label)
//! ```

mod remote;

pub use remote::{OllamaCategorizer, REMOTE_VOCABULARY, build_prompt};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::RemoteError;
use crate::models::receipt::CategoryLabel;
use crate::receipt::rules::RuleCategorizer;

/// External text classifier.
#[async_trait]
pub trait RemoteCategorizer: Send + Sync {
    /// Classify the full receipt text into a free-text category label.
    async fn categorize(&self, text: &str) -> Result<String, RemoteError>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

/// State of a category decision.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryResolution {
    /// No remote stage; the rule label is final.
    RuleOnly { rule: CategoryLabel },
    /// Waiting for the remote classifier.
    RemotePending { rule: CategoryLabel },
    /// The remote classifier answered; its text is final.
    RemoteResolved { rule: CategoryLabel, remote: String },
    /// The remote classifier failed; the rule label is final.
    RemoteFailed { rule: CategoryLabel, reason: String },
}

impl CategoryResolution {
    /// Initial state for a rule label.
    pub fn start(rule: CategoryLabel, remote_configured: bool) -> Self {
        if remote_configured {
            CategoryResolution::RemotePending { rule }
        } else {
            CategoryResolution::RuleOnly { rule }
        }
    }

    /// Apply the remote outcome. Only `RemotePending` changes state.
    pub fn complete(self, outcome: Result<String, RemoteError>) -> Self {
        let CategoryResolution::RemotePending { rule } = self else {
            return self;
        };

        match outcome {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    CategoryResolution::RemoteFailed {
                        rule,
                        reason: RemoteError::EmptyResponse.to_string(),
                    }
                } else {
                    CategoryResolution::RemoteResolved {
                        rule,
                        remote: text.to_string(),
                    }
                }
            }
            Err(e) => CategoryResolution::RemoteFailed {
                rule,
                reason: e.to_string(),
            },
        }
    }

    /// Rule label this decision started from.
    pub fn rule(&self) -> CategoryLabel {
        match self {
            CategoryResolution::RuleOnly { rule }
            | CategoryResolution::RemotePending { rule }
            | CategoryResolution::RemoteResolved { rule, .. }
            | CategoryResolution::RemoteFailed { rule, .. } => *rule,
        }
    }

    /// Final label. Never empty.
    pub fn label(&self) -> String {
        match self {
            CategoryResolution::RemoteResolved { remote, .. } => remote.clone(),
            other => other.rule().as_str().to_string(),
        }
    }

    /// Whether the remote classifier decided the label.
    pub fn is_remote(&self) -> bool {
        matches!(self, CategoryResolution::RemoteResolved { .. })
    }
}

/// Runs the rule stage and, if configured, the remote stage.
#[derive(Clone)]
pub struct CategoryResolver {
    rules: RuleCategorizer,
    remote: Option<Arc<dyn RemoteCategorizer>>,
}

impl CategoryResolver {
    pub fn new(rules: RuleCategorizer) -> Self {
        Self { rules, remote: None }
    }

    /// Add a remote classifier.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteCategorizer>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Whether a remote classifier is configured.
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Rule label only.
    pub fn rule_label(&self, merchant: &str, text: &str) -> CategoryLabel {
        self.rules.categorize(merchant, text)
    }

    /// Resolve the category for a receipt.
    pub async fn resolve(&self, merchant: &str, text: &str) -> CategoryResolution {
        let rule = self.rule_label(merchant, text);
        let state = CategoryResolution::start(rule, self.remote.is_some());

        let Some(remote) = &self.remote else {
            return state;
        };

        let state = state.complete(remote.categorize(text).await);
        match &state {
            CategoryResolution::RemoteResolved { remote: label, .. } => {
                debug!("{} classified receipt as {:?}", remote.name(), label);
            }
            CategoryResolution::RemoteFailed { reason, .. } => {
                warn!(
                    "{} classification failed, keeping rule category {}: {}",
                    remote.name(),
                    rule,
                    reason
                );
            }
            _ => {}
        }

        state
    }
}

impl Default for CategoryResolver {
    fn default() -> Self {
        Self::new(RuleCategorizer::default())
    }
}
