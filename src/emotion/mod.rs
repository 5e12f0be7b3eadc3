//! Emotion vocabulary and the face-analysis seam.
//!
//! The [`EmotionClassifier`] trait is the boundary to the external
//! face-analysis capability; [`FaceAnalysisClient`] is the production
//! implementation. Callers get back either a single [`EmotionLabel`] or a
//! [`ClassificationError`] they are expected to degrade on, never panic.

mod face_api;

pub use face_api::{FaceAnalysisClient, FaceSettings};

use std::fmt;
use std::str::FromStr;

/// Dominant facial emotion reported by the external classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Happy,
    Sad,
    Angry,
    Neutral,
    Surprise,
    Fear,
    Disgust,
}

impl EmotionLabel {
    /// Lowercase wire/display form of the label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Neutral => "neutral",
            Self::Surprise => "surprise",
            Self::Fear => "fear",
            Self::Disgust => "disgust",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionLabel {
    type Err = ClassificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "happy" => Ok(Self::Happy),
            "sad" => Ok(Self::Sad),
            "angry" => Ok(Self::Angry),
            "neutral" => Ok(Self::Neutral),
            "surprise" => Ok(Self::Surprise),
            "fear" => Ok(Self::Fear),
            "disgust" => Ok(Self::Disgust),
            other => Err(ClassificationError::UnknownLabel(other.to_string())),
        }
    }
}

/// Why a classification attempt produced no label.
///
/// Callers surface these inline and continue; a failed detection never
/// terminates the session.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error("analysis request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("analysis service returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed analysis response: {0}")]
    Decode(String),
    #[error("analysis returned no face records")]
    NoResult,
    #[error("unrecognized emotion label: {0}")]
    UnknownLabel(String),
}

/// Boundary to the external face-analysis capability.
#[async_trait::async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Classify the dominant emotion in one raw image.
    ///
    /// # Errors
    ///
    /// Returns a [`ClassificationError`] when the external call fails or its
    /// result cannot be reduced to a single known label.
    async fn classify(
        &self,
        image: &[u8],
        content_type: &str,
    ) -> Result<EmotionLabel, ClassificationError>;
}
