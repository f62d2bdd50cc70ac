//! Error types for the rcpt-core library.

use thiserror::Error;

/// Main error type for the rcpt library.
#[derive(Error, Debug)]
pub enum RcptError {
    /// Remote categorizer error.
    #[error("remote categorizer error: {0}")]
    Remote(#[from] RemoteError),

    /// The OCR stage did not produce any text.
    #[error("upstream OCR error: {0}")]
    Upstream(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors from the remote text-classification call.
///
/// All of these are recoverable: the extractor falls back to the rule-based
/// category when it sees one.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Connection or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The service answered with blank text.
    #[error("empty response")]
    EmptyResponse,

    /// The HTTP client could not be built.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else if err.is_decode() {
            RemoteError::InvalidResponse(err.to_string())
        } else {
            RemoteError::Network(err.to_string())
        }
    }
}

/// Result type for the rcpt library.
pub type Result<T> = std::result::Result<T, RcptError>;
