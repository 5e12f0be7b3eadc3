//! Emotion-aware reply generation.

use async_trait::async_trait;

use crate::emotion::EmotionLabel;

use super::{ChatCompletionsClient, GenerationError, Message};

/// Reply substituted when the completion service fails.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble finding the right words right now. Please try again in a moment.";

/// Persona establishing the assistant's register.
const SYSTEM_PROMPT: &str = "You are a helpful and empathetic AI.";

/// Produces one assistant reply for a user message and a detected emotion.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Generate a reply to `message` in light of the detected `emotion`.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] when the completion service fails; the
    /// caller is expected to substitute [`FALLBACK_REPLY`] and continue.
    async fn reply(
        &self,
        message: &str,
        emotion: EmotionLabel,
    ) -> Result<String, GenerationError>;
}

/// [`ReplyGenerator`] backed by the chat-completion service.
///
/// Sends a fixed two-message exchange: the empathetic-assistant system
/// prompt, and one user turn embedding the detected emotion and the raw
/// message.
#[derive(Debug, Clone)]
pub struct EmpatheticReplyGenerator {
    client: ChatCompletionsClient,
}

impl EmpatheticReplyGenerator {
    /// Create a generator over the given completion client.
    #[must_use]
    pub fn new(client: ChatCompletionsClient) -> Self {
        Self { client }
    }
}

/// Build the fixed-template user turn.
fn build_prompt(message: &str, emotion: EmotionLabel) -> String {
    format!(
        "The user is feeling {emotion}. They said: '{message}'. \
         Respond appropriately and empathetically in 2-3 sentences."
    )
}

#[async_trait]
impl ReplyGenerator for EmpatheticReplyGenerator {
    async fn reply(
        &self,
        message: &str,
        emotion: EmotionLabel,
    ) -> Result<String, GenerationError> {
        let messages = vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(build_prompt(message, emotion)),
        ];

        tracing::debug!(
            emotion = %emotion,
            message_length = message.len(),
            "Requesting empathetic reply"
        );

        self.client.complete(&messages).await
    }
}
