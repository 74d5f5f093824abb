//! Error types for the LLM adapter.

use chatline_core::ChatError;
use thiserror::Error;

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors raised while configuring or calling the hosted model
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM not configured. Set GROQ_API_KEY or OPENAI_API_KEY")]
    NotConfigured,

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("No response from {0}")]
    EmptyReply(String),

    #[error("Invalid settings: {0}")]
    Settings(String),
}

impl From<LlmError> for ChatError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::NotConfigured | LlmError::Settings(_) => {
                ChatError::Configuration(err.to_string())
            }
            other => ChatError::Responder(other.to_string()),
        }
    }
}
