//! LlmClient trait definition

use async_trait::async_trait;

use super::{GenerateRequest, GenerateResponse, LlmError};

/// Stateless LLM client - each call is an independent single-turn request
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one generation request and wait for the full response
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError>;
}
