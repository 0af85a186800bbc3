//! Planning error types

use thiserror::Error;

use crate::llm::LlmError;

/// Errors that can occur while planning a goal
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("No API key configured")]
    EmptyCredential,

    #[error("The model returned no content")]
    GenerationFailure,

    #[error("Malformed plan: {0}")]
    MalformedResponse(String),

    #[error("Request failed: {0}")]
    TransportFailure(#[from] LlmError),

    #[error("Prompt error: {0}")]
    Prompt(String),
}
