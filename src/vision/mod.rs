// src/vision/mod.rs
// Vision Module - Manuscript Transcription Adapters

mod gemini;
mod types;

pub use gemini::GeminiVisionAdapter;
pub use types::{ImagePayload, TranscriptionError};

use async_trait::async_trait;

/// Unified vision adapter trait
#[async_trait]
pub trait VisionAdapter: Send + Sync {
    /// Transcribe a manuscript image to text
    async fn transcribe(&self, image: &ImagePayload) -> Result<String, TranscriptionError>;

    /// Get provider name
    fn name(&self) -> &str;
}

/// Owns the configured adapter, if any. A missing credential means no
/// adapter, and every attempt fails locally before any network call.
pub struct TranscriptionEngine {
    adapter: Option<Box<dyn VisionAdapter>>,
}

impl TranscriptionEngine {
    /// Create a new engine from environment variables
    pub fn from_env() -> Self {
        let adapter = crate::config::gemini_api_key().map(|key| {
            Box::new(GeminiVisionAdapter::new(key, crate::config::model_id()))
                as Box<dyn VisionAdapter>
        });

        tracing::info!(
            "Transcription engine initialized: Gemini={}",
            adapter.is_some()
        );

        Self { adapter }
    }

    pub fn with_adapter(adapter: Box<dyn VisionAdapter>) -> Self {
        Self {
            adapter: Some(adapter),
        }
    }

    /// An engine with no credential configured.
    pub fn disabled() -> Self {
        Self { adapter: None }
    }

    pub fn is_configured(&self) -> bool {
        self.adapter.is_some()
    }

    /// Issue the single remote call for one attempt. No retry: a failed
    /// attempt is surfaced to the caller as-is.
    pub async fn transcribe(&self, image: &ImagePayload) -> Result<String, TranscriptionError> {
        let Some(adapter) = self.adapter.as_deref() else {
            tracing::warn!("Transcription attempted without an API key configured");
            return Err(TranscriptionError::MissingApiKey);
        };

        tracing::info!(
            "{}: transcribing {} image ({} base64 chars)...",
            adapter.name(),
            image.mime_type,
            image.data.len()
        );

        match adapter.transcribe(image).await {
            Ok(text) => {
                tracing::info!("{} transcription success: {} chars", adapter.name(), text.len());
                Ok(text)
            }
            Err(e) => {
                tracing::warn!("{} transcription failed: {:?}", adapter.name(), e);
                Err(e)
            }
        }
    }
}

impl Default for TranscriptionEngine {
    fn default() -> Self {
        Self::from_env()
    }
}
