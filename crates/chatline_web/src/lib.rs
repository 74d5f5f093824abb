//! # chatline_web - browser chat surface
//!
//! Serves the chat page for either variant plus a small JSON API over the
//! same sessions. The browser session is carried in the
//! [`SESSION_COOKIE`] cookie.

mod error;
mod handlers;
pub mod render;

pub use error::{status_for, ApiError, ErrorResponse};
pub use handlers::{create_router, SESSION_COOKIE};

use std::sync::Arc;
use std::time::Duration;

use chatline_core::{ChatManager, SessionRegistry};

/// Presentation settings for the web surface
#[derive(Debug, Clone, Default)]
pub struct WebConfig {
    /// Pause before the pipeline runs on a form submission
    pub typing_delay: Duration,
}

impl WebConfig {
    pub fn with_typing_delay(mut self, delay: Duration) -> Self {
        self.typing_delay = delay;
        self
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<ChatManager>,
    pub sessions: Arc<SessionRegistry>,
    pub config: Arc<WebConfig>,
}

impl AppState {
    pub fn new(manager: ChatManager, sessions: SessionRegistry, config: WebConfig) -> Self {
        Self {
            manager: Arc::new(manager),
            sessions: Arc::new(sessions),
            config: Arc::new(config),
        }
    }
}
