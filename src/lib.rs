//! Emotion-aware chat demo.
//!
//! A small server-rendered web application: the user captures a photo, the
//! server asks an external face-analysis service for the dominant emotion and
//! remembers it in the user's session; subsequent messages are answered by an
//! external chat-completion service through an emotion-aware prompt, and the
//! exchange is appended to the session's chat history.
//!
//! # Architecture
//!
//! - **Server**: Axum-based HTTP server, one handler per UI action, full page
//!   re-rendered on every interaction
//! - **External collaborators**: face analysis and chat completion sit behind
//!   the [`emotion::EmotionClassifier`] and [`llm::ReplyGenerator`] traits
//! - **State**: in-memory per-visit sessions, destroyed on reset or idle expiry
//!
//! # Modules
//!
//! - [`emotion`]: emotion vocabulary and the face-analysis adapter
//! - [`llm`]: chat-completion client and reply generation
//! - [`session`]: per-user session state and chat history
//! - [`server`]: routes and interaction handlers
//! - [`ui`]: HTML rendering

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::map_err_ignore)]
#![allow(clippy::default_trait_access)]
#![allow(clippy::unused_async)]

pub mod config;
pub mod emotion;
pub mod llm;
pub mod server;
pub mod session;
pub mod ui;

use std::sync::Arc;

use emotion::EmotionClassifier;
use llm::ReplyGenerator;
use session::SessionStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Adapter for the external face-analysis capability.
    pub classifier: Arc<dyn EmotionClassifier>,
    /// Adapter for the external chat-completion service.
    pub generator: Arc<dyn ReplyGenerator>,
    /// Session store for per-visit state.
    pub sessions: SessionStore,
}
