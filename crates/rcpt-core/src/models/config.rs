//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{RcptError, Result};
use crate::models::receipt::CategoryLabel;

/// Main configuration for the rcpt pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RcptConfig {
    /// Remote categorizer configuration.
    pub remote: RemoteConfig,

    /// Keyword rules for the local categorizer.
    pub categories: CategoryConfig,
}

/// Remote text-generation service used to classify receipts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Call the remote service at all.
    pub enabled: bool,

    /// Full URL of the generate endpoint.
    pub endpoint: String,

    /// Model identifier sent with each request.
    pub model: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://localhost:11434/api/generate".to_string(),
            model: "llama3".to_string(),
            timeout_secs: 30,
        }
    }
}

impl RemoteConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One keyword group of the local categorizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Label assigned when any keyword matches.
    pub label: CategoryLabel,

    /// Lowercase keywords, matched as substrings.
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(label: CategoryLabel, keywords: &[&str]) -> Self {
        Self {
            label,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Ordered keyword rule table. Earlier rules win.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub rules: Vec<CategoryRule>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                CategoryRule::new(
                    CategoryLabel::Travel,
                    &[
                        "uber", "lyft", "taxi", "airline", "airways", "flight", "airport",
                        "amtrak", "railway", "transit", "boarding pass",
                    ],
                ),
                CategoryRule::new(
                    CategoryLabel::FoodAndDrink,
                    &[
                        "restaurant", "cafe", "café", "coffee", "starbucks", "mcdonald",
                        "burger", "pizza", "diner", "bistro", "bakery", "grill", "sushi",
                        "taco", "dunkin", "brewery",
                    ],
                ),
                CategoryRule::new(
                    CategoryLabel::Groceries,
                    &[
                        "grocery", "groceries", "supermarket", "market", "whole foods",
                        "trader joe", "kroger", "safeway", "aldi", "produce",
                    ],
                ),
                CategoryRule::new(
                    CategoryLabel::Lodging,
                    &[
                        "hotel", "motel", "resort", "airbnb", "lodging", "hostel",
                        "marriott", "hilton", "hyatt",
                    ],
                ),
                CategoryRule::new(
                    CategoryLabel::PharmacyHealth,
                    &[
                        "pharmacy", "cvs", "walgreens", "rite aid", "drugstore", "clinic",
                        "medical", "health",
                    ],
                ),
                CategoryRule::new(
                    CategoryLabel::Shopping,
                    &[
                        "walmart", "target", "amazon", "shopping", "retail", "best buy", "ikea",
                        "clothing", "boutique", "shop",
                    ],
                ),
                CategoryRule::new(
                    CategoryLabel::GasTransport,
                    &[
                        "fuel", "gasoline", "petrol", "gas station", "shell", "chevron",
                        "exxon", "parking",
                    ],
                ),
                CategoryRule::new(
                    CategoryLabel::Utilities,
                    &[
                        "electric", "utility", "utilities", "water bill", "internet",
                        "phone bill", "comcast", "verizon", "billing period",
                    ],
                ),
            ],
        }
    }
}

impl RcptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values that serde cannot reject on its own.
    pub fn validate(&self) -> Result<()> {
        if self.remote.enabled {
            if self.remote.endpoint.trim().is_empty() {
                return Err(RcptError::Config("remote.endpoint is empty".to_string()));
            }
            if self.remote.model.trim().is_empty() {
                return Err(RcptError::Config("remote.model is empty".to_string()));
            }
            if self.remote.timeout_secs == 0 {
                return Err(RcptError::Config("remote.timeout_secs must be positive".to_string()));
            }
        }

        for rule in &self.categories.rules {
            if rule.label == CategoryLabel::Other {
                return Err(RcptError::Config(
                    "\"Other\" is the fallback label and cannot have keywords".to_string(),
                ));
            }
            if rule.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(RcptError::Config(format!(
                    "category rule {} has no keywords",
                    rule.label
                )));
            }
        }

        Ok(())
    }
}
