//! Chat-completion client.
//!
//! Groq and OpenAI both speak the OpenAI chat-completions dialect, so one
//! request/response shape covers both. Each call is a single attempt with the
//! HTTP client's default timeouts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use chatline_core::{ChatResult, Reply, Responder, Role, TokenUsage, Turn};

use crate::config::LlmConfig;
use crate::error::{LlmError, LlmResult};

/// LLM adapter that handles API calls
pub struct LlmAdapter {
    config: LlmConfig,
    client: reqwest::Client,
}

impl LlmAdapter {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Get the current model
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Complete a conversation with the LLM
    pub async fn complete(&self, turns: &[Turn]) -> LlmResult<Reply> {
        let request = build_request(&self.config.model, turns);
        let provider = self.config.provider.display_name();

        debug!(
            provider,
            model = %self.config.model,
            messages = request.messages.len(),
            "sending chat completion"
        );

        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(provider, status = status.as_u16(), "chat completion rejected");
            return Err(LlmError::Api {
                provider: provider.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        parse_response(provider, &self.config.model, &body)
    }
}

#[async_trait]
impl Responder for LlmAdapter {
    async fn respond(&self, turns: &[Turn]) -> ChatResult<Reply> {
        Ok(self.complete(turns).await?)
    }
}

/// Map turns onto the wire request
pub(crate) fn build_request(model: &str, turns: &[Turn]) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: turns
            .iter()
            .map(|t| ChatMessage {
                role: match t.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                content: t.content.clone(),
            })
            .collect(),
    }
}

/// Extract the first choice from a chat-completions response body
pub(crate) fn parse_response(provider: &str, model: &str, body: &str) -> LlmResult<Reply> {
    let result: ChatResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Parse(e.to_string()))?;

    let content = result
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmError::EmptyReply(provider.to_string()))?;

    let usage = result.usage.map(|u| TokenUsage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    });

    Ok(Reply {
        content,
        model: Some(result.model.unwrap_or_else(|| model.to_string())),
        usage,
    })
}

// OpenAI-compatible API types
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
