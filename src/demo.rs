// src/demo.rs — demo manuscript fetch (no-upload example)

use crate::vision::ImagePayload;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use thiserror::Error;

/// Surfaced to the user whenever the demo path fails, whatever the cause.
pub const DEMO_FETCH_ERROR_MESSAGE: &str = "Failed to load demo image. Please upload your own.";

const FALLBACK_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Demo asset request returned HTTP {0}")]
    HttpError(u16),

    #[error("Demo asset response was empty")]
    EmptyBody,
}

/// Fetch the demo manuscript and produce the same transfer payload a local
/// file selection would.
pub async fn fetch_demo_image(url: &str) -> Result<ImagePayload, FetchError> {
    tracing::info!("Fetching demo manuscript from {}", url);

    let response = reqwest::Client::new()
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::NetworkError(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpError(status.as_u16()));
    }

    let mime_type = mime_from_content_type(
        response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
    );

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::NetworkError(e.to_string()))?;

    if bytes.is_empty() {
        return Err(FetchError::EmptyBody);
    }

    tracing::info!("Demo manuscript fetched: {} bytes, {}", bytes.len(), mime_type);

    Ok(ImagePayload::new(mime_type, BASE64_STANDARD.encode(&bytes)))
}

/// Content-Type header value without parameters, with a JPEG fallback when
/// the header is missing or not an image type.
fn mime_from_content_type(header: Option<&str>) -> String {
    header
        .map(|value| value.split(';').next().unwrap_or(value).trim())
        .filter(|value| value.starts_with("image/"))
        .map(|value| value.to_string())
        .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_content_type_strips_parameters() {
        assert_eq!(
            mime_from_content_type(Some("image/png; charset=binary")),
            "image/png"
        );
        assert_eq!(mime_from_content_type(Some("image/jpeg")), "image/jpeg");
    }

    #[test]
    fn test_mime_from_content_type_falls_back_to_jpeg() {
        assert_eq!(mime_from_content_type(None), "image/jpeg");
        assert_eq!(mime_from_content_type(Some("text/html")), "image/jpeg");
    }
}
