//! Linear stage pipeline.
//!
//! A [`Pipeline`] is an ordered list of [`Stage`]s. [`Pipeline::advance`]
//! feeds the conversation state through each stage in turn; the first error
//! aborts the run and is returned unchanged.
//!
//! # Phases
//!
//! ```text
//! multi-agent:  Start → Normalized → Classified → Responded → Logged → End
//! single-agent: Start → Responded → End
//! ```
//!
//! Once a stage has produced the assistant reply, later stages may read it
//! but not rewrite it. The orchestrator checks this after every such stage.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use crate::error::{ChatError, ChatResult};
use crate::logger::{TracingSink, TurnRecord, TurnSink};
use crate::normalize::normalize;
use crate::responder::Responder;
use crate::sentiment::analyze;
use crate::types::{ConversationState, Turn, Variant};

/// Where a pipeline run stands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    Start,
    Normalized,
    Classified,
    Responded,
    Logged,
    End,
}

/// One step of the pipeline.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Phase the run is in after this stage completes
    fn reaches(&self) -> PipelinePhase;

    async fn run(&self, state: ConversationState) -> ChatResult<ConversationState>;
}

/// Trims the newest turn.
#[derive(Debug, Default)]
pub struct NormalizeStage;

#[async_trait]
impl Stage for NormalizeStage {
    fn name(&self) -> &'static str {
        "preprocess"
    }

    fn reaches(&self) -> PipelinePhase {
        PipelinePhase::Normalized
    }

    async fn run(&self, state: ConversationState) -> ChatResult<ConversationState> {
        normalize(state)
    }
}

/// Tags the state with the newest turn's sentiment.
#[derive(Debug, Default)]
pub struct ClassifyStage;

#[async_trait]
impl Stage for ClassifyStage {
    fn name(&self) -> &'static str {
        "analyze_sentiment"
    }

    fn reaches(&self) -> PipelinePhase {
        PipelinePhase::Classified
    }

    async fn run(&self, state: ConversationState) -> ChatResult<ConversationState> {
        analyze(state)
    }
}

/// Asks the remote model for the next turn and appends it.
pub struct RespondStage {
    responder: Arc<dyn Responder>,
}

impl RespondStage {
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self { responder }
    }
}

#[async_trait]
impl Stage for RespondStage {
    fn name(&self) -> &'static str {
        "chatbot"
    }

    fn reaches(&self) -> PipelinePhase {
        PipelinePhase::Responded
    }

    async fn run(&self, mut state: ConversationState) -> ChatResult<ConversationState> {
        let last = state.last_turn()?;
        if !last.is_user() {
            return Err(ChatError::invalid_state(
                "respond",
                "conversation ending with a user turn",
                format!("last turn from {}", last.role.as_str()),
            ));
        }

        let reply = self.responder.respond(&state.turns).await?;
        if let Some(usage) = reply.usage {
            debug!(
                model = reply.model.as_deref().unwrap_or("unknown"),
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "responder usage"
            );
        }

        state.turns.push(Turn::assistant(reply.content));
        Ok(state)
    }
}

/// Hands the newest turn and sentiment to a [`TurnSink`].
pub struct LogStage {
    sink: Arc<dyn TurnSink>,
}

impl LogStage {
    pub fn new(sink: Arc<dyn TurnSink>) -> Self {
        Self { sink }
    }
}

impl Default for LogStage {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

#[async_trait]
impl Stage for LogStage {
    fn name(&self) -> &'static str {
        "logger"
    }

    fn reaches(&self) -> PipelinePhase {
        PipelinePhase::Logged
    }

    async fn run(&self, state: ConversationState) -> ChatResult<ConversationState> {
        match TurnRecord::from_state(&state) {
            Some(record) => self.sink.record(&record),
            None => debug!("nothing to log for an empty conversation"),
        }
        Ok(state)
    }
}

/// Ordered stages for one chat variant.
pub struct Pipeline {
    variant: Variant,
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create a pipeline with no stages
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            stages: Vec::new(),
        }
    }

    /// Append a stage.
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Respond only.
    pub fn single_agent(responder: Arc<dyn Responder>) -> Self {
        Self::new(Variant::SingleAgent).stage(RespondStage::new(responder))
    }

    /// Normalize, classify, respond, log.
    pub fn multi_agent(responder: Arc<dyn Responder>, sink: Arc<dyn TurnSink>) -> Self {
        Self::new(Variant::MultiAgent)
            .stage(NormalizeStage)
            .stage(ClassifyStage)
            .stage(RespondStage::new(responder))
            .stage(LogStage::new(sink))
    }

    /// The standard pipeline for `variant`. The sink is unused by the single-agent variant.
    pub fn for_variant(
        variant: Variant,
        responder: Arc<dyn Responder>,
        sink: Arc<dyn TurnSink>,
    ) -> Self {
        match variant {
            Variant::SingleAgent => Self::single_agent(responder),
            Variant::MultiAgent => Self::multi_agent(responder, sink),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Every phase a successful run passes through, `Start` to `End`
    pub fn phases(&self) -> Vec<PipelinePhase> {
        let mut phases = Vec::with_capacity(self.stages.len() + 2);
        phases.push(PipelinePhase::Start);
        phases.extend(self.stages.iter().map(|s| s.reaches()));
        phases.push(PipelinePhase::End);
        phases
    }

    /// Run every stage against `state` and return the final state.
    pub async fn advance(&self, state: ConversationState) -> ChatResult<ConversationState> {
        let span = info_span!("pipeline", variant = %self.variant, turns = state.turns.len());
        self.run_stages(state).instrument(span).await
    }

    async fn run_stages(&self, mut state: ConversationState) -> ChatResult<ConversationState> {
        let mut reply: Option<(Uuid, String)> = None;

        for stage in &self.stages {
            debug!(stage = stage.name(), "stage started");
            state = stage.run(state).await?;

            if let Some(expected) = &reply {
                check_reply_untouched(stage.name(), &state, expected)?;
            } else if stage.reaches() == PipelinePhase::Responded {
                let turn = state.last_turn()?;
                reply = Some((turn.id, turn.content.clone()));
            }

            debug!(stage = stage.name(), phase = ?stage.reaches(), "stage finished");
        }

        debug!(phase = ?PipelinePhase::End, "pipeline finished");
        Ok(state)
    }
}

fn check_reply_untouched(
    stage: &str,
    state: &ConversationState,
    (id, content): &(Uuid, String),
) -> ChatResult<()> {
    match state.turns.iter().find(|t| t.id == *id) {
        Some(turn) if turn.content == *content => Ok(()),
        Some(_) => Err(ChatError::invalid_state(
            stage,
            "assistant reply unchanged after respond",
            "assistant reply rewritten",
        )),
        None => Err(ChatError::invalid_state(
            stage,
            "assistant reply unchanged after respond",
            "assistant reply removed",
        )),
    }
}
