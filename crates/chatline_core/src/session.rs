//! Chat session manager.
//!
//! This module provides the main entry point for chat operations: it takes
//! a user submission, records it in the session and runs the pipeline.

use tracing::{info, warn};

use crate::error::{ChatError, ChatResult};
use crate::pipeline::Pipeline;
use crate::store::ChatSession;
use crate::types::{ConversationState, Exchange, HistoryMode, Turn, Variant};

/// Main chat session manager
pub struct ChatManager {
    pipeline: Pipeline,
    history: HistoryMode,
}

impl ChatManager {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            history: HistoryMode::default(),
        }
    }

    pub fn with_history(mut self, history: HistoryMode) -> Self {
        self.history = history;
        self
    }

    pub fn variant(&self) -> Variant {
        self.pipeline.variant()
    }

    pub fn history_mode(&self) -> HistoryMode {
        self.history
    }

    /// Send a message in `session` and return the resulting exchange.
    ///
    /// The user turn is appended before the pipeline runs and stays in the
    /// session if the run fails. On success the reply turn and sentiment are
    /// merged into the session.
    pub async fn submit(&self, session: &mut ChatSession, input: &str) -> ChatResult<Exchange> {
        if input.trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }

        let user = Turn::user(input);
        let user_id = user.id;
        let snapshot = match self.history {
            HistoryMode::Full => {
                let mut turns = session.read_all().to_vec();
                turns.push(user.clone());
                ConversationState::new(turns)
            }
            HistoryMode::Latest => ConversationState::new(vec![user.clone()]),
        };
        session.append(user);

        info!(
            session = %session.id(),
            variant = %self.variant(),
            turns = snapshot.turns.len(),
            "message submitted"
        );

        let base = snapshot.turns.len();
        let state = match self.pipeline.advance(snapshot).await {
            Ok(state) => state,
            Err(e) => {
                warn!(session = %session.id(), error = %e, "pipeline run failed");
                return Err(e);
            }
        };

        for turn in state.turns.into_iter().skip(base) {
            session.append(turn);
        }
        if let Some(sentiment) = state.sentiment {
            session.annotate(user_id, sentiment);
        }

        session.exchange_for(user_id).ok_or_else(|| {
            ChatError::invalid_state("submit", "exchange for submitted turn", "missing")
        })
    }
}
