//! Port for the hosted language model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChatResult;
use crate::types::Turn;

/// Token counts reported by the provider for one call
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// The text of the next assistant turn, plus call metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl Reply {
    /// A reply with no call metadata
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: None,
            usage: None,
        }
    }
}

/// Produces the next turn for an ordered conversation.
///
/// Implementations make a single attempt; failures surface as
/// [`crate::ChatError::Responder`] and are not retried by callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Responder: Send + Sync {
    /// `turns` is never empty and always ends with a user turn.
    async fn respond(&self, turns: &[Turn]) -> ChatResult<Reply>;
}
