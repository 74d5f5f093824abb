//! # chatline_llm - hosted model responder
//!
//! Implements [`chatline_core::Responder`] over an OpenAI-compatible
//! chat-completions endpoint (Groq by default, OpenAI optionally).
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use chatline_llm::{LlmAdapter, LlmConfig};
//!
//! let adapter = LlmAdapter::new(LlmConfig::from_env()?);
//! let pipeline = chatline_core::Pipeline::single_agent(Arc::new(adapter));
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::LlmAdapter;
pub use config::{LlmConfig, LlmProvider};
pub use error::{LlmError, LlmResult};
