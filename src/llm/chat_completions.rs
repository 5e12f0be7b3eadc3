//! `OpenAI` Chat Completions API client.
//!
//! Non-streaming driver for `/v1/chat/completions`: one request, one
//! response, the first choice's message content is the completion. No retry
//! and no client-side timeout; the service's own limits apply.

use super::{GenerationError, LlmSettings, Message};

/// Client for the `OpenAI` Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl std::fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("settings", &self.settings)
            .finish()
    }
}

impl ChatCompletionsClient {
    /// Create a new Chat Completions client with the given settings.
    #[must_use]
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    /// Get the client settings.
    #[must_use]
    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    /// Request a single completion for the given messages.
    ///
    /// Returns the first choice's message content, whitespace-trimmed.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] when the request fails, the service
    /// answers with a non-success status, or the response carries no text.
    pub async fn complete(&self, messages: &[Message]) -> Result<String, GenerationError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model": self.settings.model,
            "messages": messages,
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
        });

        tracing::debug!(
            url = %url,
            model = %self.settings.model,
            message_count = messages.len(),
            "Requesting chat completion"
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, body });
        }

        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| GenerationError::Decode(e.to_string()))?;

        let content = v["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(GenerationError::EmptyCompletion)?;

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(GenerationError::EmptyCompletion);
        }

        tracing::debug!(content_length = trimmed.len(), "Chat completion received");
        Ok(trimmed.to_string())
    }
}
