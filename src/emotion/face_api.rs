//! HTTP client for the face-analysis service.
//!
//! The service exposes a DeepFace-style analyze endpoint: one image in, a
//! list of per-face result records out, each carrying a `dominant_emotion`
//! field. Only the emotion action is requested, and strict face detection is
//! disabled so an image with no detectable face still yields a label instead
//! of an error.

use base64::Engine;
use serde::Deserialize;

use super::{ClassificationError, EmotionClassifier, EmotionLabel};

/// Connection settings for the face-analysis service.
#[derive(Debug, Clone)]
pub struct FaceSettings {
    /// Base URL of the analysis service.
    pub base_url: String,
    /// Optional API key for authentication.
    pub api_key: Option<String>,
}

/// [`EmotionClassifier`] backed by the face-analysis HTTP service.
#[derive(Clone)]
pub struct FaceAnalysisClient {
    http: reqwest::Client,
    settings: FaceSettings,
}

impl std::fmt::Debug for FaceAnalysisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaceAnalysisClient")
            .field("settings", &self.settings)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    results: Vec<FaceRecord>,
}

#[derive(Debug, Deserialize)]
struct FaceRecord {
    dominant_emotion: String,
}

impl FaceAnalysisClient {
    /// Create a new face-analysis client with the given settings.
    #[must_use]
    pub fn new(settings: FaceSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }
}

#[async_trait::async_trait]
impl EmotionClassifier for FaceAnalysisClient {
    async fn classify(
        &self,
        image: &[u8],
        content_type: &str,
    ) -> Result<EmotionLabel, ClassificationError> {
        let url = format!("{}/analyze", self.settings.base_url.trim_end_matches('/'));

        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let body = serde_json::json!({
            "img": format!("data:{content_type};base64,{encoded}"),
            "actions": ["emotion"],
            "enforce_detection": false,
        });

        let mut rb = self.http.post(&url).json(&body);
        if let Some(k) = &self.settings.api_key {
            rb = rb.bearer_auth(k);
        }

        tracing::debug!(
            url = %url,
            image_bytes = image.len(),
            "Sending image for emotion analysis"
        );

        let resp = rb.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClassificationError::Api { status, body });
        }

        let parsed: AnalyzeResponse = resp
            .json()
            .await
            .map_err(|e| ClassificationError::Decode(e.to_string()))?;

        // Only the first face record is used.
        let first = parsed
            .results
            .into_iter()
            .next()
            .ok_or(ClassificationError::NoResult)?;

        first.dominant_emotion.parse()
    }
}
