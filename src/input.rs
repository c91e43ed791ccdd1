// src/input.rs
// File input boundary: image validation and transfer encoding

use crate::vision::ImagePayload;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Please upload an image file (JPG, PNG, WEBP).")]
    UnsupportedType,

    #[error("Error processing file")]
    Unreadable(#[source] std::io::Error),
}

/// MIME type for a path, derived from the extension alone. Anything that
/// does not map to an `image/*` type is rejected upstream; no magic-byte
/// sniffing is done.
pub fn mime_type_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}

/// Read a chosen image file and produce the transfer payload. Fails before
/// any session state changes, so a rejected file leaves the session idle.
pub fn encode_image_file(path: &Path) -> Result<ImagePayload, EncodingError> {
    let mime_type = mime_type_for_path(path).ok_or(EncodingError::UnsupportedType)?;

    let bytes = fs::read(path).map_err(EncodingError::Unreadable)?;

    tracing::debug!(
        "Encoded {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        mime_type
    );

    Ok(ImagePayload::new(mime_type, BASE64_STANDARD.encode(bytes)))
}
