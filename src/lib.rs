mod config;
mod demo;
mod export;
mod input;
mod session;
mod vision;

use session::{SessionSnapshot, SourceImage, TranscriptionSession, ViewMode, ViewState};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tauri::{AppHandle, Emitter, State};
use tokio::sync::Mutex as TokioMutex;
use vision::{ImagePayload, TranscriptionEngine};

const SESSION_UPDATED_EVENT: &str = "session-updated";

struct AppState {
    session: Arc<TokioMutex<TranscriptionSession>>,
    engine: Arc<TokioMutex<TranscriptionEngine>>,
    view: Arc<Mutex<ViewState>>,
}

fn emit_session(app_handle: &AppHandle, snapshot: &SessionSnapshot) {
    let _ = app_handle.emit(SESSION_UPDATED_EVENT, snapshot);
}

/// Runs the analyzing half of an attempt: the single remote call, then the
/// terminal transition. The caller already moved the session to uploading.
async fn finish_attempt(
    session: &mut TranscriptionSession,
    engine: &TranscriptionEngine,
    payload: &ImagePayload,
    app_handle: &AppHandle,
) -> SessionSnapshot {
    session.begin_analysis();
    emit_session(app_handle, &session.snapshot());

    match engine.transcribe(payload).await {
        Ok(text) => session.complete(text),
        Err(e) => {
            if e.is_configuration() {
                tracing::error!("Transcription blocked by configuration: {}", e);
            } else {
                tracing::error!("Transcription failed: {}", e);
            }
            session.fail(e.to_string());
        }
    }

    let snapshot = session.snapshot();
    emit_session(app_handle, &snapshot);
    snapshot
}

#[tauri::command]
async fn get_session(state: State<'_, AppState>) -> Result<SessionSnapshot, String> {
    let session = state.session.lock().await;
    Ok(session.snapshot())
}

#[tauri::command]
async fn transcribe_image_file(
    path: String,
    state: State<'_, AppState>,
    app_handle: AppHandle,
) -> Result<SessionSnapshot, String> {
    let path = PathBuf::from(path);

    // Rejected and unreadable files never start an attempt: the session
    // stays idle and the message is surfaced to the caller directly.
    let payload = input::encode_image_file(&path).map_err(|e| e.to_string())?;
    let source = SourceImage::file(path.display().to_string(), payload.mime_type.clone());

    let mut session = state.session.lock().await;
    session.begin_upload(Some(source)).map_err(|e| e.to_string())?;
    emit_session(&app_handle, &session.snapshot());

    let engine = state.engine.lock().await;
    Ok(finish_attempt(&mut session, &engine, &payload, &app_handle).await)
}

#[tauri::command]
async fn load_demo_image(
    state: State<'_, AppState>,
    app_handle: AppHandle,
) -> Result<SessionSnapshot, String> {
    let mut session = state.session.lock().await;
    session.begin_upload(None).map_err(|e| e.to_string())?;
    emit_session(&app_handle, &session.snapshot());

    let url = config::demo_image_url();
    let payload = match demo::fetch_demo_image(&url).await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Demo fetch failed: {}", e);
            session.fail(demo::DEMO_FETCH_ERROR_MESSAGE);
            let snapshot = session.snapshot();
            emit_session(&app_handle, &snapshot);
            return Ok(snapshot);
        }
    };

    session.attach_source(SourceImage::demo(url, payload.mime_type.clone()));

    let engine = state.engine.lock().await;
    Ok(finish_attempt(&mut session, &engine, &payload, &app_handle).await)
}

#[tauri::command]
async fn reset_session(
    state: State<'_, AppState>,
    app_handle: AppHandle,
) -> Result<SessionSnapshot, String> {
    let mut session = state.session.lock().await;
    session.reset();

    if let Ok(mut view) = state.view.lock() {
        view.reset();
    }

    let snapshot = session.snapshot();
    emit_session(&app_handle, &snapshot);
    Ok(snapshot)
}

#[tauri::command]
fn get_view_state(state: State<'_, AppState>) -> Result<ViewState, String> {
    let view = state.view.lock().map_err(|e| e.to_string())?;
    Ok(*view)
}

#[tauri::command]
fn set_view_mode(mode: ViewMode, state: State<'_, AppState>) -> Result<ViewState, String> {
    let mut view = state.view.lock().map_err(|e| e.to_string())?;
    view.set_mode(mode);
    Ok(*view)
}

#[tauri::command]
fn zoom_in(state: State<'_, AppState>) -> Result<ViewState, String> {
    let mut view = state.view.lock().map_err(|e| e.to_string())?;
    view.zoom_in();
    Ok(*view)
}

#[tauri::command]
fn zoom_out(state: State<'_, AppState>) -> Result<ViewState, String> {
    let mut view = state.view.lock().map_err(|e| e.to_string())?;
    view.zoom_out();
    Ok(*view)
}

#[tauri::command]
async fn copy_transcription(
    state: State<'_, AppState>,
    app_handle: AppHandle,
) -> Result<(), String> {
    let session = state.session.lock().await;
    let text = session.transcription().map_err(|e| e.to_string())?;
    export::copy_to_clipboard(&app_handle, text).map_err(|e| e.to_string())
}

#[tauri::command]
async fn save_transcription(
    state: State<'_, AppState>,
    app_handle: AppHandle,
) -> Result<String, String> {
    let session = state.session.lock().await;
    let text = session.transcription().map_err(|e| e.to_string())?;
    let path = export::save_to_downloads(&app_handle, text).map_err(|e| e.to_string())?;
    Ok(path.display().to_string())
}

#[tauri::command]
fn get_config_status() -> config::ConfigStatus {
    config::status()
}

#[tauri::command]
async fn reload_config(state: State<'_, AppState>) -> Result<config::ConfigStatus, String> {
    let mut engine = state.engine.lock().await;
    *engine = TranscriptionEngine::from_env();
    tracing::info!("Configuration reloaded: configured={}", engine.is_configured());
    Ok(config::status())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Load environment variables from .env file
    let _ = dotenvy::dotenv();
    init_tracing();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_clipboard_manager::init())
        .manage(AppState {
            session: Arc::new(TokioMutex::new(TranscriptionSession::default())),
            engine: Arc::new(TokioMutex::new(TranscriptionEngine::from_env())),
            view: Arc::new(Mutex::new(ViewState::default())),
        })
        .invoke_handler(tauri::generate_handler![
            get_session,
            transcribe_image_file,
            load_demo_image,
            reset_session,
            get_view_state,
            set_view_mode,
            zoom_in,
            zoom_out,
            copy_transcription,
            save_transcription,
            get_config_status,
            reload_config
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
