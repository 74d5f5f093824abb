//! Core types for the chat pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ChatError, ChatResult};

/// Unique identifier for a chat session
pub type SessionId = String;

/// Message role in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    /// Unique turn ID
    pub id: Uuid,
    /// Role of the message sender
    pub role: Role,
    /// Message text
    pub content: String,
    /// When the turn was created
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Turn {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a new user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Coarse mood label derived from keyword presence
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    /// Bubble color used when rendering a reply tagged with this sentiment
    pub fn color(&self) -> &'static str {
        match self {
            Self::Positive => "#32CD32",
            Self::Negative => "#FF6347",
            Self::Neutral => "#A9A9A9",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Positive => "😄",
            Self::Negative => "😟",
            Self::Neutral => "😐",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which pipeline a chat application runs
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Respond only
    SingleAgent,
    /// Normalize, classify, respond, log
    #[default]
    MultiAgent,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleAgent => "single",
            Self::MultiAgent => "multi",
        }
    }

    /// Whether replies in this variant carry a sentiment tag
    pub fn tags_sentiment(&self) -> bool {
        matches!(self, Self::MultiAgent)
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Variant {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "single-agent" => Ok(Self::SingleAgent),
            "multi" | "multi-agent" => Ok(Self::MultiAgent),
            other => Err(ChatError::Configuration(format!("unknown variant '{}'", other))),
        }
    }
}

/// How much of the session history a submission hands to the pipeline
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// Every stored turn, oldest first
    #[default]
    Full,
    /// Only the newly submitted user turn
    Latest,
}

/// The state threaded through every pipeline stage
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationState {
    /// Ordered turns, oldest first
    pub turns: Vec<Turn>,
    /// Label for the most recently processed user turn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

impl ConversationState {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self {
            turns,
            sentiment: None,
        }
    }

    /// State holding a single user message
    pub fn from_user(content: impl Into<String>) -> Self {
        Self::new(vec![Turn::user(content)])
    }

    pub fn last_turn(&self) -> ChatResult<&Turn> {
        self.turns.last().ok_or(ChatError::EmptyConversation)
    }

    pub fn last_turn_mut(&mut self) -> ChatResult<&mut Turn> {
        self.turns.last_mut().ok_or(ChatError::EmptyConversation)
    }

    /// True when the newest turn was written by the user
    pub fn awaits_reply(&self) -> bool {
        self.turns.last().map(Turn::is_user).unwrap_or(false)
    }
}

/// One user message with the reply it produced, as shown in the UI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exchange {
    pub user: Turn,
    /// `None` while pending or after a failed run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<Turn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}
