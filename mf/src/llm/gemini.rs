//! Google Gemini API client implementation
//!
//! Implements the LlmClient trait for the `generateContent` endpoint with
//! structured (JSON schema) output.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{GenerateRequest, GenerateResponse, LlmClient, LlmError};
use crate::config::LlmConfig;

/// Gemini API client
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
}

impl GeminiClient {
    /// Create a new client from configuration and a resolved credential
    ///
    /// No request timeout is set; the transport's defaults apply.
    pub fn from_config(config: &LlmConfig, api_key: String) -> Result<Self, LlmError> {
        debug!(?config, "from_config: called");
        let http = Client::builder().build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the request body for the Gemini API
    fn build_request_body(&self, request: &GenerateRequest) -> serde_json::Value {
        debug!(%self.model, mime = %request.response_mime_type, "build_request_body: called");
        let mut generation_config = serde_json::json!({
            "responseMimeType": request.response_mime_type,
        });

        if let Some(schema) = &request.response_schema {
            debug!("build_request_body: adding response schema");
            generation_config["responseSchema"] = schema.clone();
        }

        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
            "generationConfig": generation_config,
        })
    }

    /// Parse the Gemini API response
    ///
    /// Text parts of the first candidate are concatenated; a response with no
    /// candidate or no text part yields `text: None`.
    fn parse_response(&self, api_response: GeminiResponse) -> GenerateResponse {
        let Some(candidate) = api_response.candidates.into_iter().next() else {
            debug!(?api_response.prompt_feedback, "parse_response: no candidates");
            return GenerateResponse::default();
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        debug!(text_len = text.len(), finish_reason = ?candidate.finish_reason, "parse_response: parsed");
        GenerateResponse {
            text: if text.is_empty() { None } else { Some(text) },
            finish_reason: candidate.finish_reason,
        }
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError> {
        debug!(%self.model, "generate: called");
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.clone())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            debug!(%status, "generate: API error");
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, message: text });
        }

        debug!("generate: success");
        let api_response: GeminiResponse = response.json().await?;
        Ok(self.parse_response(api_response))
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}
