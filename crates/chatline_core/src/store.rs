//! In-memory chat session storage.
//!
//! A [`ChatSession`] is the append-only turn history for one UI session.
//! The [`SessionRegistry`] owns every live session for the process and can
//! optionally drop sessions that have been idle longer than a TTL.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::types::{Exchange, Role, Sentiment, SessionId, Turn};

/// Append-only turn history for one session
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: SessionId,
    created_at: DateTime<Utc>,
    turns: Vec<Turn>,
    /// Sentiment per user turn id
    sentiments: HashMap<Uuid, Sentiment>,
}

impl ChatSession {
    /// Create an empty session with a fresh id
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<SessionId>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            turns: Vec::new(),
            sentiments: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Every turn, oldest first
    pub fn read_all(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Record the sentiment computed for a user turn
    pub fn annotate(&mut self, user_turn: Uuid, sentiment: Sentiment) {
        self.sentiments.insert(user_turn, sentiment);
    }

    pub fn sentiment_for(&self, user_turn: Uuid) -> Option<Sentiment> {
        self.sentiments.get(&user_turn).copied()
    }

    /// Group turns into user/reply pairs for display.
    ///
    /// Each user turn opens an exchange; the next assistant turn, if any,
    /// becomes its reply.
    pub fn exchanges(&self) -> Vec<Exchange> {
        let mut exchanges: Vec<Exchange> = Vec::new();
        for turn in &self.turns {
            match turn.role {
                Role::User => exchanges.push(Exchange {
                    user: turn.clone(),
                    reply: None,
                    sentiment: self.sentiment_for(turn.id),
                }),
                Role::Assistant => {
                    if let Some(open) = exchanges.last_mut().filter(|e| e.reply.is_none()) {
                        open.reply = Some(turn.clone());
                    }
                }
            }
        }
        exchanges
    }

    /// The exchange opened by `user_turn`
    pub fn exchange_for(&self, user_turn: Uuid) -> Option<Exchange> {
        self.exchanges().into_iter().find(|e| e.user.id == user_turn)
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// A session shared between request handlers.
///
/// The async mutex is held for a whole submission, so each session accepts
/// one submission at a time.
pub type SharedSession = Arc<tokio::sync::Mutex<ChatSession>>;

struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

/// Process-wide table of live sessions
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Entry>>,
    idle_ttl: Option<Duration>,
}

impl SessionRegistry {
    /// Sessions live until the process exits
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl: None,
        }
    }

    /// Sessions idle for `ttl` or longer are dropped on the next access
    pub fn with_idle_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl: Some(ttl),
        }
    }

    pub fn idle_ttl(&self) -> Option<Duration> {
        self.idle_ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, Entry>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create and register a new empty session
    pub fn create(&self) -> (SessionId, SharedSession) {
        self.purge_expired();
        let session = ChatSession::new();
        let id = session.id().to_string();
        let shared = Arc::new(tokio::sync::Mutex::new(session));
        self.lock().insert(
            id.clone(),
            Entry {
                session: shared.clone(),
                last_seen: Instant::now(),
            },
        );
        info!(session = %id, "session created");
        (id, shared)
    }

    /// Look up a live session and mark it as seen
    pub fn get(&self, id: &str) -> Option<SharedSession> {
        self.purge_expired();
        let mut sessions = self.lock();
        sessions.get_mut(id).map(|entry| {
            entry.last_seen = Instant::now();
            entry.session.clone()
        })
    }

    /// Resolve `id` to a live session, creating one when it is missing or
    /// unknown. The flag is `true` when a new session was created.
    pub fn get_or_create(&self, id: Option<&str>) -> (SessionId, SharedSession, bool) {
        if let Some(id) = id {
            if let Some(session) = self.get(id) {
                return (id.to_string(), session, false);
            }
            debug!(session = %id, "unknown session id, starting a new session");
        }
        let (id, session) = self.create();
        (id, session, true)
    }

    /// Mark a session as active, typically once a submission finishes
    pub fn touch(&self, id: &str) {
        self.touch_at(id, Instant::now());
    }

    /// [`Self::touch`] with an explicit timestamp
    pub fn touch_at(&self, id: &str, now: Instant) {
        if let Some(entry) = self.lock().get_mut(id) {
            entry.last_seen = now;
        }
    }

    /// Drop sessions that are past the idle TTL. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    /// [`Self::purge_expired`] evaluated at `now`
    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let Some(ttl) = self.idle_ttl else {
            return 0;
        };
        let mut sessions = self.lock();
        let before = sessions.len();
        // A session locked by an in-flight submission is never idle.
        sessions.retain(|_, entry| {
            now.saturating_duration_since(entry.last_seen) < ttl
                || entry.session.try_lock().is_err()
        });
        let dropped = before - sessions.len();
        if dropped > 0 {
            info!(dropped, remaining = sessions.len(), "expired idle sessions");
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
