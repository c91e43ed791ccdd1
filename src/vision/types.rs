// src/vision/types.rs
// Vision Types and Error Definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An encoded manuscript image ready for transport.
///
/// Built once per attempt from the chosen file or the demo asset and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// MIME type of the original image (e.g. "image/jpeg")
    pub mime_type: String,
    /// Base64-encoded image bytes (standard alphabet)
    pub data: String,
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// Transcription error types
#[derive(Debug, Clone, Error)]
pub enum TranscriptionError {
    #[error("API key is missing. Set GEMINI_API_KEY in your environment or .env file.")]
    MissingApiKey,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Model endpoint returned HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("Invalid response from model endpoint: {0}")]
    InvalidResponse(String),

    #[error("No transcription could be generated.")]
    EmptyTranscription,
}

impl TranscriptionError {
    /// Returns true when the failure is a local configuration problem
    /// rather than a remote inference failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, TranscriptionError::MissingApiKey)
    }
}
