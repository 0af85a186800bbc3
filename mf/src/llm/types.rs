//! LLM request/response types
//!
//! Modeled on Gemini's `generateContent` but free of provider wire details.

use serde_json::Value;

/// MIME type asking the model for JSON output
pub const JSON_MIME: &str = "application/json";

/// MIME type asking the model for plain text output
pub const TEXT_MIME: &str = "text/plain";

/// A single-turn generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// User prompt
    pub prompt: String,

    /// Requested output MIME type
    pub response_mime_type: String,

    /// Schema constraining JSON output (OpenAPI subset, upper-case type names)
    pub response_schema: Option<Value>,
}

impl GenerateRequest {
    /// Request JSON output constrained to `schema`
    pub fn json(prompt: impl Into<String>, schema: Value) -> Self {
        Self {
            prompt: prompt.into(),
            response_mime_type: JSON_MIME.to_string(),
            response_schema: Some(schema),
        }
    }

    /// Request free-form text output
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response_mime_type: TEXT_MIME.to_string(),
            response_schema: None,
        }
    }
}

/// Result of a generation request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateResponse {
    /// Generated text, if the model produced any
    pub text: Option<String>,

    /// Provider-reported stop reason (e.g. "STOP", "SAFETY")
    pub finish_reason: Option<String>,
}

impl GenerateResponse {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            finish_reason: Some("STOP".to_string()),
        }
    }

    /// Text if present and not blank
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}
