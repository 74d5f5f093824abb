//! # chatline_core - conversation pipeline and session state
//!
//! This crate holds everything about a chat exchange that does not touch
//! the network or a UI:
//! - Typed turns, sentiment labels and conversation state
//! - The text normalizer and keyword sentiment classifier
//! - The [`Responder`] port the hosted model is plugged into
//! - The linear stage [`Pipeline`] for the single- and multi-agent variants
//! - Per-session turn storage and the [`SessionRegistry`]
//!
//! ## Flow
//!
//! ```text
//! submit ──▶ append user turn ──▶ Pipeline::advance(snapshot) ──▶ merge reply + sentiment
//!
//! multi-agent:  Start → Normalized → Classified → Responded → Logged → End
//! single-agent: Start → Responded → End
//! ```

pub mod error;
pub mod logger;
pub mod normalize;
pub mod pipeline;
pub mod responder;
pub mod sentiment;
pub mod session;
pub mod store;
pub mod types;

pub use error::{ChatError, ChatResult};
pub use logger::{RecordingSink, TracingSink, TurnRecord, TurnSink};
pub use normalize::{normalize, normalize_text};
pub use pipeline::{
    ClassifyStage, LogStage, NormalizeStage, Pipeline, PipelinePhase, RespondStage, Stage,
};
pub use responder::{Reply, Responder, TokenUsage};
pub use sentiment::{analyze, classify, NEGATIVE_KEYWORDS, POSITIVE_KEYWORDS};
pub use session::ChatManager;
pub use store::{ChatSession, SessionRegistry, SharedSession};
pub use types::{
    ConversationState, Exchange, HistoryMode, Role, Sentiment, SessionId, Turn, Variant,
};
