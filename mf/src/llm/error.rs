//! LLM error types

use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown LLM provider: '{0}'. Supported: gemini")]
    UnsupportedProvider(String),
}

impl LlmError {
    /// Whether the service rejected the credential
    pub fn is_auth_error(&self) -> bool {
        matches!(self, LlmError::ApiError { status: 401 | 403, .. })
    }
}
