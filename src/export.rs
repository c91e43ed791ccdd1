// src/export.rs — transcription text export (clipboard + download)

use std::fs;
use std::path::{Path, PathBuf};
use tauri::{AppHandle, Manager, Runtime};
use tauri_plugin_clipboard_manager::ClipboardExt;
use thiserror::Error;

pub const EXPORT_FILE_NAME: &str = "transcription.txt";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("No download directory available")]
    NoDownloadDir,

    #[error("Failed to write transcription file: {0}")]
    Io(#[from] std::io::Error),
}

pub fn copy_to_clipboard<R: Runtime>(app: &AppHandle<R>, text: &str) -> Result<(), ExportError> {
    app.clipboard()
        .write_text(text.to_string())
        .map_err(|e| ExportError::Clipboard(e.to_string()))?;

    tracing::info!("Transcription copied to clipboard ({} chars)", text.len());
    Ok(())
}

/// Write the transcription into the user's download directory and reveal
/// the file.
pub fn save_to_downloads<R: Runtime>(
    app: &AppHandle<R>,
    text: &str,
) -> Result<PathBuf, ExportError> {
    let dir = app
        .path()
        .download_dir()
        .map_err(|_| ExportError::NoDownloadDir)?;

    let path = write_transcription_file(&dir, text)?;
    if let Err(e) = tauri_plugin_opener::reveal_item_in_dir(&path) {
        tracing::warn!("Could not reveal {}: {}", path.display(), e);
    }

    Ok(path)
}

pub fn write_transcription_file(dir: &Path, text: &str) -> Result<PathBuf, ExportError> {
    let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, text)?;

    tracing::info!("Transcription saved to {}", path.display());
    Ok(path)
}
