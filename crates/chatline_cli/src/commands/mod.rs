//! CLI command definitions.
//!
//! `serve` runs the browser chat app; `chat` runs the same session and
//! pipeline in the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};

use chatline_core::{ChatManager, HistoryMode, Pipeline, TracingSink, Variant};
use chatline_llm::config::{GROQ_API_KEY, OPENAI_API_KEY};
use chatline_llm::{LlmAdapter, LlmConfig, LlmProvider, LlmResult};

pub mod chat;
pub mod serve;

/// chatline - LLM chat with an optional sentiment pipeline
#[derive(Parser)]
#[command(name = "chatline")]
#[command(version, about = "chatline - LLM chat with an optional sentiment pipeline")]
#[command(long_about = r#"
chatline routes chat messages through a hosted language model.

VARIANTS:
  single  → the model replies to the conversation
  multi   → trim → classify sentiment → reply → log

COMMANDS:
  serve   → browser chat UI and JSON API
  chat    → terminal chat

CONFIGURATION:
  GROQ_API_KEY / OPENAI_API_KEY   provider credential
  CHATLINE_MODEL                  model override
  CHATLINE_BASE_URL               endpoint override
  .chatline/settings.json         defaultProvider / defaultModel

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Configuration error
  4 - Responder error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the browser chat app
    Serve(serve::ServeArgs),

    /// Chat in the terminal
    Chat(chat::ChatArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VariantArg {
    Single,
    Multi,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Single => Variant::SingleAgent,
            VariantArg::Multi => Variant::MultiAgent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HistoryArg {
    /// Send the whole conversation
    Full,
    /// Send only the newest message
    Latest,
}

impl From<HistoryArg> for HistoryMode {
    fn from(arg: HistoryArg) -> Self {
        match arg {
            HistoryArg::Full => HistoryMode::Full,
            HistoryArg::Latest => HistoryMode::Latest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    Groq,
    Openai,
}

impl From<ProviderArg> for LlmProvider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Groq => LlmProvider::Groq,
            ProviderArg::Openai => LlmProvider::OpenAi,
        }
    }
}

/// Pipeline options shared by every command
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Which chat app to run
    #[arg(long, value_enum, default_value_t = VariantArg::Multi)]
    pub variant: VariantArg,

    /// How much history each message sends to the model
    #[arg(long, value_enum, default_value_t = HistoryArg::Full)]
    pub history: HistoryArg,

    #[command(flatten)]
    pub llm: LlmArgs,
}

impl PipelineArgs {
    /// Build the chat manager backed by the hosted model
    pub fn build_manager(&self) -> LlmResult<ChatManager> {
        let config = self.llm.resolve()?;
        tracing::info!(
            provider = config.provider.display_name(),
            model = %config.model,
            variant = %Variant::from(self.variant),
            "responder configured"
        );

        let pipeline = Pipeline::for_variant(
            self.variant.into(),
            Arc::new(LlmAdapter::new(config)),
            Arc::new(TracingSink),
        );
        Ok(ChatManager::new(pipeline).with_history(self.history.into()))
    }
}

/// Responder options; flags win over the environment and settings file
#[derive(Args, Debug, Clone)]
pub struct LlmArgs {
    /// Model provider; skips the settings file when given
    #[arg(long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// API credential for the provider
    #[arg(long, env = "CHATLINE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the chat-completions API
    #[arg(long)]
    pub base_url: Option<String>,

    /// Directory holding .chatline/settings.json
    #[arg(long, default_value = ".")]
    pub settings_root: PathBuf,
}

impl LlmArgs {
    pub fn resolve(&self) -> LlmResult<LlmConfig> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// [`Self::resolve`] with a custom environment lookup
    pub fn resolve_with(&self, env: impl Fn(&str) -> Option<String>) -> LlmResult<LlmConfig> {
        let api_key = self.api_key.clone();
        let lookup = move |key: &str| match (&api_key, key) {
            (Some(k), GROQ_API_KEY | OPENAI_API_KEY) => Some(k.clone()),
            _ => env(key),
        };

        let mut config = match self.provider {
            Some(provider) => LlmConfig::for_provider(provider.into(), &lookup)?,
            None => LlmConfig::from_settings_with(&self.settings_root, &lookup)?,
        };
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        Ok(config)
    }
}
