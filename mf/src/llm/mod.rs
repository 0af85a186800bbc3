//! LLM Client module for MindFlow
//!
//! Provides single-turn generation requests against a hosted model.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod gemini;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use types::{GenerateRequest, GenerateResponse, JSON_MIME, TEXT_MIME};

use crate::config::LlmConfig;

/// Create an LLM client based on the provider specified in config
///
/// Returns `Ok(None)` when no credential is configured; callers treat that as
/// "AI features unavailable" rather than a startup failure.
pub fn create_client(config: &LlmConfig) -> Result<Option<Arc<dyn LlmClient>>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "gemini" => {
            let Some(api_key) = config.get_api_key() else {
                debug!(env = %config.api_key_env, "create_client: no credential configured");
                return Ok(None);
            };
            debug!("create_client: creating Gemini client");
            Ok(Some(Arc::new(GeminiClient::from_config(config, api_key)?)))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::UnsupportedProvider(other.to_string()))
        }
    }
}
