//! Responder configuration.
//!
//! Sources, lowest precedence first: `.chatline/settings.json`, environment
//! variables, then whatever the caller layers on with the `with_*` builders.

use std::path::Path;

use serde::Deserialize;

use crate::error::{LlmError, LlmResult};

/// Environment variable holding the Groq credential
pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
/// Environment variable holding the OpenAI credential
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Optional model override
pub const MODEL_VAR: &str = "CHATLINE_MODEL";
/// Optional endpoint override
pub const BASE_URL_VAR: &str = "CHATLINE_BASE_URL";

/// Hosted chat-completion provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LlmProvider {
    #[default]
    Groq,
    OpenAi,
}

impl LlmProvider {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Groq => "Groq",
            Self::OpenAi => "OpenAI",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Groq => "gemma2-9b-it",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }

    /// Environment variable the credential is read from
    pub fn key_var(&self) -> &'static str {
        match self {
            Self::Groq => GROQ_API_KEY,
            Self::OpenAi => OPENAI_API_KEY,
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAi),
            other => Err(LlmError::Settings(format!("unknown provider '{}'", other))),
        }
    }
}

/// Everything needed to call the hosted model
#[derive(Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

// The credential stays out of debug output.
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl LlmConfig {
    /// Explicit configuration; `model` falls back to the provider default
    pub fn new(provider: LlmProvider, api_key: impl Into<String>, model: Option<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: model.unwrap_or_else(|| provider.default_model().to_string()),
            base_url: provider.default_base_url().to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Full URL of the chat-completions endpoint
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Create a config from environment variables
    ///
    /// Checks in order:
    /// 1. GROQ_API_KEY
    /// 2. OPENAI_API_KEY
    pub fn from_env() -> LlmResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// [`Self::from_env`] with a custom variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LlmResult<Self> {
        let provider = [LlmProvider::Groq, LlmProvider::OpenAi]
            .into_iter()
            .find(|p| non_empty(&lookup, p.key_var()).is_some())
            .ok_or(LlmError::NotConfigured)?;
        Self::for_provider(provider, &lookup)
    }

    /// Read the credential for a specific provider from `lookup`
    pub fn for_provider(
        provider: LlmProvider,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> LlmResult<Self> {
        let api_key = non_empty(&lookup, provider.key_var()).ok_or(LlmError::NotConfigured)?;
        let mut config = Self::new(provider, api_key, non_empty(&lookup, MODEL_VAR));
        if let Some(base_url) = non_empty(&lookup, BASE_URL_VAR) {
            config.base_url = base_url;
        }
        Ok(config)
    }

    /// Create a config from workspace settings
    ///
    /// Provider and model come from `<root>/.chatline/settings.json` when the
    /// file exists; the credential always comes from the environment. Without
    /// a `defaultProvider` the provider is detected as in [`Self::from_env`].
    pub fn from_settings(root: &Path) -> LlmResult<Self> {
        Self::from_settings_with(root, |key| std::env::var(key).ok())
    }

    /// [`Self::from_settings`] with a custom variable lookup
    pub fn from_settings_with(
        root: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> LlmResult<Self> {
        let settings = Settings::load(root)?;
        let mut config = match settings.default_provider.as_deref() {
            Some(name) => Self::for_provider(name.parse()?, &lookup)?,
            None => Self::from_lookup(&lookup)?,
        };

        // Environment overrides beat the settings file.
        if let Some(model) = settings.default_model {
            if non_empty(&lookup, MODEL_VAR).is_none() {
                config.model = model;
            }
        }
        if let Some(base_url) = settings.base_url {
            if non_empty(&lookup, BASE_URL_VAR).is_none() {
                config.base_url = base_url;
            }
        }
        Ok(config)
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Settings {
    default_provider: Option<String>,
    default_model: Option<String>,
    base_url: Option<String>,
}

impl Settings {
    fn load(root: &Path) -> LlmResult<Self> {
        let path = root.join(".chatline").join("settings.json");
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| LlmError::Settings(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| LlmError::Settings(format!("{}: {}", path.display(), e)))
    }
}
