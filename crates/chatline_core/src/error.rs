//! Error types for the chat pipeline.

use thiserror::Error;

/// Result type for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Chat system errors
#[derive(Error, Debug)]
pub enum ChatError {
    /// A stage needed the latest turn but the conversation has none
    #[error("Conversation has no turns to process")]
    EmptyConversation,

    /// Submitted text was blank after trimming
    #[error("Message is empty")]
    EmptyInput,

    /// Conversation state does not satisfy the operation's precondition
    #[error("Invalid state for {operation}: current={current}, expected={expected}")]
    InvalidState {
        current: String,
        expected: String,
        operation: String,
    },

    /// The remote model call failed
    #[error("Responder error: {0}")]
    Responder(String),

    /// No live session with this id
    #[error("Chat session not found: {0}")]
    SessionNotFound(String),

    /// Process configuration is missing or malformed
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ChatError {
    /// Shorthand for an [`ChatError::InvalidState`] raised by `operation`.
    pub fn invalid_state(
        operation: impl Into<String>,
        expected: impl Into<String>,
        current: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            current: current.into(),
            expected: expected.into(),
            operation: operation.into(),
        }
    }

    /// Whether the failure came from the remote model rather than local state.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Responder(_))
    }
}
