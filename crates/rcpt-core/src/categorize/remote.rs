//! Remote classification through an Ollama-style generate endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::RemoteCategorizer;
use crate::error::RemoteError;
use crate::models::config::RemoteConfig;

/// Labels offered to the remote model.
///
/// This list is worded differently from the keyword rules (`Health` rather
/// than `Pharmacy/Health`, `Gas` rather than `Gas/Transport`). Answers are
/// stored verbatim, so both spellings can show up in saved receipts.
pub const REMOTE_VOCABULARY: [&str; 9] = [
    "Travel",
    "Food & Drink",
    "Groceries",
    "Lodging",
    "Health",
    "Shopping",
    "Gas",
    "Utilities",
    "Other",
];

/// Build the classification prompt for a receipt.
pub fn build_prompt(text: &str) -> String {
    format!(
        "Classify this receipt into exactly one of these categories: {}.\n\
         Reply with the category name only, with no extra text.\n\n\
         Receipt:\n{}",
        REMOTE_VOCABULARY.join(", "),
        text
    )
}

/// Remote categorizer calling a text-generation service.
///
/// One request per call, no retries. The trimmed generated text is returned
/// without checking it against [`REMOTE_VOCABULARY`].
#[derive(Clone)]
pub struct OllamaCategorizer {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaCategorizer {
    /// Create a categorizer from configuration.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RemoteError::Configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }

    /// Endpoint URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute_request(&self, request: &GenerateRequest<'_>) -> Result<GenerateResponse, RemoteError> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl RemoteCategorizer for OllamaCategorizer {
    async fn categorize(&self, text: &str) -> Result<String, RemoteError> {
        let prompt = build_prompt(text);
        let request = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            stream: false,
        };

        debug!("Requesting remote category from {}", self.endpoint);
        let response = self.execute_request(&request).await?;

        let label = response.response.trim();
        if label.is_empty() {
            return Err(RemoteError::EmptyResponse);
        }

        Ok(label.to_string())
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}
