//! Chat-completion client and reply generation.
//!
//! This module provides the boundary to the hosted chat-completion service.
//! [`ChatCompletionsClient`] speaks the `OpenAI` Chat Completions protocol
//! (`/v1/chat/completions`) with a single blocking call per interaction, and
//! [`EmpatheticReplyGenerator`] builds the emotion-aware prompt on top of it.
//!
//! # Example
//!
//! ```rust,ignore
//! use emochat::llm::{ChatCompletionsClient, EmpatheticReplyGenerator, LlmSettings};
//!
//! let settings = LlmSettings {
//!     base_url: "https://api.example.com".to_string(),
//!     api_key: "sk-...".to_string(),
//!     model: "gpt-4o-mini".to_string(),
//!     max_tokens: 100,
//!     temperature: 0.7,
//! };
//! let generator = EmpatheticReplyGenerator::new(ChatCompletionsClient::new(settings));
//! ```

pub mod chat_completions;
pub mod generator;

pub use chat_completions::ChatCompletionsClient;
pub use generator::{EmpatheticReplyGenerator, FALLBACK_REPLY, ReplyGenerator};

/// Default bound on completion length, in output tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 100;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Connection and sampling settings for the completion service.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Base URL for the LLM API (e.g., `https://api.openai.com`).
    pub base_url: String,
    /// API key for authentication. Required; there is no built-in default.
    pub api_key: String,
    /// Model identifier (e.g., `gpt-4o-mini`).
    pub model: String,
    /// Maximum output tokens per completion.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    /// Role of the message author.
    pub role: MessageRole,
    /// Text content of the message.
    pub content: String,
}

impl Message {
    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt.
    System,
    /// User message.
    User,
    /// Assistant response.
    Assistant,
}

/// Why a completion attempt produced no reply.
///
/// The send handler substitutes [`FALLBACK_REPLY`] for any of these; a failed
/// generation never aborts the interaction.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion service returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed completion response: {0}")]
    Decode(String),
    #[error("completion response contained no usable choice")]
    EmptyCompletion,
}
