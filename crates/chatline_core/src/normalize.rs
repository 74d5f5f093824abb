//! Whitespace cleanup for the newest turn.

use crate::error::ChatResult;
use crate::types::ConversationState;

/// Strip leading and trailing whitespace, leaving interior spacing intact.
pub fn normalize_text(text: &str) -> &str {
    text.trim()
}

/// Return `state` with the last turn's text trimmed.
///
/// Fails with [`crate::ChatError::EmptyConversation`] when there is no turn.
pub fn normalize(mut state: ConversationState) -> ChatResult<ConversationState> {
    let last = state.last_turn_mut()?;
    let trimmed = normalize_text(&last.content);
    if trimmed.len() != last.content.len() {
        last.content = trimmed.to_string();
    }
    Ok(state)
}
