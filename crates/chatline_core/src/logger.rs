//! Turn logging.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{ConversationState, Sentiment};

/// What the logger captures about the newest turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnRecord {
    pub content: String,
    pub sentiment: Option<Sentiment>,
}

impl TurnRecord {
    /// Build a record from the newest turn, or `None` for an empty state.
    pub fn from_state(state: &ConversationState) -> Option<Self> {
        state.turns.last().map(|turn| Self {
            content: turn.content.clone(),
            sentiment: state.sentiment,
        })
    }

    /// Sentiment label, or `"none"` when the pass produced no sentiment
    pub fn sentiment_label(&self) -> &'static str {
        self.sentiment.as_ref().map(Sentiment::as_str).unwrap_or("none")
    }
}

impl std::fmt::Display for TurnRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LOG: {}, Sentiment: {}", self.content, self.sentiment_label())
    }
}

/// Destination for turn records. Must not fail.
pub trait TurnSink: Send + Sync {
    fn record(&self, record: &TurnRecord);
}

/// Emits each record as a `chatline::turn` tracing event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TurnSink for TracingSink {
    fn record(&self, record: &TurnRecord) {
        info!(
            target: "chatline::turn",
            content = %record.content,
            sentiment = record.sentiment_label(),
            "{}",
            record
        );
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<TurnRecord>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn records(&self) -> Vec<TurnRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl TurnSink for RecordingSink {
    fn record(&self, record: &TurnRecord) {
        let mut records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        records.push(record.clone());
    }
}
