//! Per-visit session state and the in-memory store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::emotion::EmotionLabel;

/// Idle timeout after which a session may be reaped (30 minutes).
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Speaker role for one line of chat history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The visitor.
    User,
    /// The completion service.
    Assistant,
}

impl Speaker {
    /// Display prefix for lines spoken by this role.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "AI",
        }
    }
}

/// One line of chat history. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChatLine {
    /// Who spoke the line.
    pub speaker: Speaker,
    /// Message text, without the speaker prefix.
    pub text: String,
}

impl ChatLine {
    /// Create a line spoken by the visitor.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    /// Create a line spoken by the assistant.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for ChatLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.speaker.prefix(), self.text)
    }
}

/// A single visitor's interaction state.
///
/// Holds the last detected emotion (overwritten by each new detection) and
/// the append-only chat history, and provides methods for updating both.
#[derive(Debug)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Unique session identifier.
    id: String,
    /// Last detected emotion, if any.
    emotion: RwLock<Option<EmotionLabel>>,
    /// Chat transcript in insertion order.
    history: RwLock<Vec<ChatLine>>,
    /// Last activity time.
    last_activity: RwLock<DateTime<Utc>>,
}

impl Clone for Session {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Session {
    /// Create a new session with the given ID.
    fn new(id: String) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id,
                emotion: RwLock::new(None),
                history: RwLock::new(Vec::new()),
                last_activity: RwLock::new(Utc::now()),
            }),
        }
    }

    /// Get the session ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Get the last detected emotion, if any.
    #[must_use]
    pub fn emotion(&self) -> Option<EmotionLabel> {
        *self.inner.emotion.read().unwrap()
    }

    /// Overwrite the current detected emotion.
    pub fn set_emotion(&self, label: EmotionLabel) {
        let mut guard = self.inner.emotion.write().unwrap();
        *guard = Some(label);
        drop(guard);
        self.touch();
    }

    /// Append one full user/assistant exchange.
    ///
    /// Both lines go in under a single write lock, so a concurrent render
    /// never observes the user line without its reply.
    pub fn record_exchange(&self, user_text: impl Into<String>, reply_text: impl Into<String>) {
        let mut guard = self.inner.history.write().unwrap();
        guard.push(ChatLine::user(user_text));
        guard.push(ChatLine::assistant(reply_text));
        drop(guard);
        self.touch();
    }

    /// Get the chat history in insertion order.
    #[must_use]
    pub fn history(&self) -> Vec<ChatLine> {
        self.inner.history.read().unwrap().clone()
    }

    /// Get the number of lines in the chat history.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.inner.history.read().unwrap().len()
    }

    /// Update the last activity timestamp.
    fn touch(&self) {
        let mut guard = self.inner.last_activity.write().unwrap();
        *guard = Utc::now();
    }

    /// Check if the session has been idle longer than the timeout.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        let last = *self.inner.last_activity.read().unwrap();
        let now = Utc::now();
        if let Ok(duration) = (now - last).to_std() {
            duration > timeout
        } else {
            // Negative duration means clock skew or "last" is in future.
            false
        }
    }
}

/// Thread-safe store for sessions.
///
/// Provides methods for creating, retrieving, and cleaning up sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

#[derive(Debug)]
struct SessionStoreInner {
    sessions: RwLock<HashMap<String, Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a new session store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Create a new session and return it.
    #[must_use]
    pub fn create(&self) -> Session {
        let id = Uuid::new_v4().to_string();
        let session = Session::new(id.clone());
        let mut guard = self.inner.sessions.write().unwrap();
        guard.insert(id, session.clone());
        session
    }

    /// Get a session by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Session> {
        let guard = self.inner.sessions.read().unwrap();
        guard.get(id).cloned()
    }

    /// Remove a session by ID.
    pub fn remove(&self, id: &str) -> Option<Session> {
        let mut guard = self.inner.sessions.write().unwrap();
        guard.remove(id)
    }

    /// Get the number of active sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.sessions.read().unwrap().len()
    }

    /// Check if there are no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove sessions that have been inactive longer than the timeout.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self.inner.sessions.write().unwrap();
        let before = guard.len();
        guard.retain(|_, session| !session.is_expired_with_timeout(timeout));
        before - guard.len()
    }
}
