// Session lifecycle for one transcription attempt:
// idle -> uploading -> analyzing -> success | error -> (reset) -> idle

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

mod view;

pub use view::{ViewMode, ViewState};

/// Shown when a failure carries no usable message of its own.
const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Uploading,
    Analyzing,
    Success,
    Error,
}

/// Opaque handle to the displayed image: a local file path or the demo
/// asset URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceImage {
    pub location: String,
    pub mime_type: String,
    pub is_demo: bool,
}

impl SourceImage {
    pub fn file(path: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            location: path.into(),
            mime_type: mime_type.into(),
            is_demo: false,
        }
    }

    pub fn demo(url: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            location: url.into(),
            mime_type: mime_type.into(),
            is_demo: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("A transcription attempt is already in progress")]
    AttemptInFlight,

    #[error("The previous attempt must be reset before starting a new one")]
    NotIdle,

    #[error("No transcription available")]
    NoTranscription,
}

/// UI-facing copy of the session, pushed on every transition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub source: Option<SourceImage>,
    pub result_text: Option<String>,
    pub error_message: Option<String>,
    pub attempt_id: Option<String>,
}

/// The one per-app session object. Exactly one of result_text and
/// error_message is set once a terminal state is reached; neither exists
/// before that.
pub struct TranscriptionSession {
    status: SessionStatus,
    source: Option<SourceImage>,
    result_text: Option<String>,
    error_message: Option<String>,
    attempt_id: Option<String>,
}

impl Default for TranscriptionSession {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            source: None,
            result_text: None,
            error_message: None,
            attempt_id: None,
        }
    }
}

impl TranscriptionSession {
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(
            self.status,
            SessionStatus::Uploading | SessionStatus::Analyzing
        )
    }

    /// Start a new attempt. The source is known up front for file
    /// selections; the demo path attaches it after the fetch resolves.
    pub fn begin_upload(&mut self, source: Option<SourceImage>) -> Result<String, SessionError> {
        match self.status {
            SessionStatus::Idle => {}
            SessionStatus::Uploading | SessionStatus::Analyzing => {
                return Err(SessionError::AttemptInFlight)
            }
            SessionStatus::Success | SessionStatus::Error => return Err(SessionError::NotIdle),
        }

        let attempt_id = Uuid::new_v4().to_string();
        tracing::info!("Started transcription attempt {}", attempt_id);

        self.status = SessionStatus::Uploading;
        self.source = source;
        self.result_text = None;
        self.error_message = None;
        self.attempt_id = Some(attempt_id.clone());

        Ok(attempt_id)
    }

    pub fn attach_source(&mut self, source: SourceImage) {
        debug_assert!(self.is_in_flight());
        self.source = Some(source);
    }

    /// Encoding is done; the remote call is about to be issued.
    pub fn begin_analysis(&mut self) {
        debug_assert_eq!(self.status, SessionStatus::Uploading);
        self.status = SessionStatus::Analyzing;
    }

    pub fn complete(&mut self, text: String) {
        debug_assert!(self.is_in_flight());
        tracing::info!(
            "Attempt {} succeeded: {} chars",
            self.attempt_id.as_deref().unwrap_or("?"),
            text.len()
        );

        self.status = SessionStatus::Success;
        self.result_text = Some(text);
        self.error_message = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        let message = if message.trim().is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            message
        };

        tracing::warn!(
            "Attempt {} failed: {}",
            self.attempt_id.as_deref().unwrap_or("?"),
            message
        );

        self.status = SessionStatus::Error;
        self.error_message = Some(message);
        self.result_text = None;
    }

    /// Discard everything and return to idle. The only way out of a
    /// terminal state.
    pub fn reset(&mut self) {
        tracing::info!("Session reset");
        *self = Self::default();
    }

    pub fn transcription(&self) -> Result<&str, SessionError> {
        match (self.status, self.result_text.as_deref()) {
            (SessionStatus::Success, Some(text)) => Ok(text),
            _ => Err(SessionError::NoTranscription),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            source: self.source.clone(),
            result_text: self.result_text.clone(),
            error_message: self.error_message.clone(),
            attempt_id: self.attempt_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::test_support::StubAdapter;
    use crate::vision::{ImagePayload, TranscriptionEngine, TranscriptionError};

    fn sample_source() -> SourceImage {
        SourceImage::file("/archive/carta_1543.jpg", "image/jpeg")
    }

    fn sample_payload() -> ImagePayload {
        ImagePayload::new("image/jpeg", "aGVsbG8=")
    }

    /// Drives an attempt the way the command layer does.
    async fn run_attempt(
        session: &mut TranscriptionSession,
        engine: &TranscriptionEngine,
    ) -> SessionSnapshot {
        session.begin_upload(Some(sample_source())).unwrap();
        session.begin_analysis();
        match engine.transcribe(&sample_payload()).await {
            Ok(text) => session.complete(text),
            Err(e) => session.fail(e.to_string()),
        }
        session.snapshot()
    }

    fn assert_result_exclusivity(snapshot: &SessionSnapshot) {
        match snapshot.status {
            SessionStatus::Idle | SessionStatus::Uploading | SessionStatus::Analyzing => {
                assert!(snapshot.result_text.is_none());
                assert!(snapshot.error_message.is_none());
            }
            SessionStatus::Success => {
                assert!(snapshot.result_text.is_some());
                assert!(snapshot.error_message.is_none());
            }
            SessionStatus::Error => {
                assert!(snapshot.result_text.is_none());
                assert!(snapshot.error_message.is_some());
            }
        }
    }

    #[test]
    fn test_new_session_is_empty_idle() {
        let session = TranscriptionSession::default();
        let snapshot = session.snapshot();

        assert_eq!(snapshot.status, SessionStatus::Idle);
        assert!(snapshot.source.is_none());
        assert!(snapshot.result_text.is_none());
        assert!(snapshot.error_message.is_none());
        assert!(snapshot.attempt_id.is_none());
    }

    #[test]
    fn test_transitions_walk_upload_to_success() {
        let mut session = TranscriptionSession::default();

        session.begin_upload(Some(sample_source())).unwrap();
        assert_eq!(session.status(), SessionStatus::Uploading);
        assert_result_exclusivity(&session.snapshot());

        session.begin_analysis();
        assert_eq!(session.status(), SessionStatus::Analyzing);
        assert_result_exclusivity(&session.snapshot());

        session.complete("En el nombre de Dios".to_string());
        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Success);
        assert_eq!(snapshot.result_text.as_deref(), Some("En el nombre de Dios"));
        assert_result_exclusivity(&snapshot);
    }

    #[test]
    fn test_failure_always_carries_a_message() {
        let mut session = TranscriptionSession::default();
        session.begin_upload(None).unwrap();
        session.fail("");

        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Error);
        assert_eq!(
            snapshot.error_message.as_deref(),
            Some("An unexpected error occurred.")
        );
        assert_result_exclusivity(&snapshot);
    }

    #[test]
    fn test_second_attempt_rejected_while_in_flight() {
        let mut session = TranscriptionSession::default();
        session.begin_upload(Some(sample_source())).unwrap();

        assert_eq!(
            session.begin_upload(None).unwrap_err(),
            SessionError::AttemptInFlight
        );

        session.begin_analysis();
        assert_eq!(
            session.begin_upload(None).unwrap_err(),
            SessionError::AttemptInFlight
        );
    }

    #[test]
    fn test_terminal_states_require_reset() {
        let mut session = TranscriptionSession::default();
        session.begin_upload(Some(sample_source())).unwrap();
        session.begin_analysis();
        session.complete("texto".to_string());

        assert_eq!(session.begin_upload(None).unwrap_err(), SessionError::NotIdle);

        session.reset();
        assert!(session.begin_upload(None).is_ok());
    }

    #[test]
    fn test_reset_clears_every_field() {
        let mut session = TranscriptionSession::default();
        session.begin_upload(Some(sample_source())).unwrap();
        session.begin_analysis();
        session.fail("remote call failed");

        session.reset();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Idle);
        assert!(snapshot.source.is_none());
        assert!(snapshot.result_text.is_none());
        assert!(snapshot.error_message.is_none());
        assert!(snapshot.attempt_id.is_none());
    }

    #[test]
    fn test_transcription_only_available_in_success() {
        let mut session = TranscriptionSession::default();
        assert_eq!(
            session.transcription().unwrap_err(),
            SessionError::NoTranscription
        );

        session.begin_upload(Some(sample_source())).unwrap();
        session.begin_analysis();
        session.complete("folio recto".to_string());
        assert_eq!(session.transcription().unwrap(), "folio recto");
    }

    #[tokio::test]
    async fn test_attempt_with_responding_endpoint_reaches_success() {
        let engine = TranscriptionEngine::with_adapter(StubAdapter::text("T"));
        let mut session = TranscriptionSession::default();

        let snapshot = run_attempt(&mut session, &engine).await;
        assert_eq!(snapshot.status, SessionStatus::Success);
        assert_eq!(snapshot.result_text.as_deref(), Some("T"));
    }

    #[tokio::test]
    async fn test_attempt_with_failing_endpoint_reaches_error() {
        let engine = TranscriptionEngine::with_adapter(StubAdapter::failing(
            TranscriptionError::NetworkError("connection refused".to_string()),
        ));
        let mut session = TranscriptionSession::default();

        let snapshot = run_attempt(&mut session, &engine).await;
        assert_eq!(snapshot.status, SessionStatus::Error);
        let message = snapshot.error_message.expect("error message present");
        assert!(!message.is_empty());
        assert!(message.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_attempt_without_credential_fails_with_config_message() {
        let engine = TranscriptionEngine::disabled();
        let mut session = TranscriptionSession::default();

        let snapshot = run_attempt(&mut session, &engine).await;
        assert_eq!(snapshot.status, SessionStatus::Error);
        assert!(snapshot
            .error_message
            .expect("error message present")
            .contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_snapshot_serializes_lowercase_status() {
        let session = TranscriptionSession::default();
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["status"], "idle");
        assert_eq!(json["resultText"], serde_json::Value::Null);
    }
}
