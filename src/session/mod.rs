//! Session and chat-history management.
//!
//! This module provides in-memory session storage for the interaction state
//! of one page visit: the last detected emotion and the append-only chat
//! transcript. Sessions are identified by UUID and live until the visitor
//! resets them or they sit idle long enough to be reaped.
//!
//! # Architecture
//!
//! - [`Session`]: the state of a single visit
//! - [`SessionStore`]: thread-safe store for all active sessions
//!
//! # Example
//!
//! ```rust
//! use emochat::emotion::EmotionLabel;
//! use emochat::session::SessionStore;
//!
//! let store = SessionStore::new();
//! let session = store.create();
//! session.set_emotion(EmotionLabel::Happy);
//! session.record_exchange("I got the job!", "Congratulations!");
//!
//! assert_eq!(session.line_count(), 2);
//! ```

mod thread;

pub use thread::{ChatLine, DEFAULT_SESSION_TIMEOUT, Session, SessionStore, Speaker};
