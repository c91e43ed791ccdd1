use serde::Serialize;

pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_DEMO_IMAGE_URL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/6/64/Carta_de_Juan_de_la_Cosa.jpg/800px-Carta_de_Juan_de_la_Cosa.jpg";

const API_KEY_ENV: &str = "GEMINI_API_KEY";
const MODEL_ENV: &str = "SCRIPTORIUM_MODEL";
const DEMO_IMAGE_URL_ENV: &str = "SCRIPTORIUM_DEMO_URL";

/// Credential presence and the active model, for the settings view.
/// The key itself never leaves this module unmasked.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigStatus {
    pub has_api_key: bool,
    pub api_key_masked: Option<String>,
    pub model: String,
}

pub fn gemini_api_key() -> Option<String> {
    non_empty_env(API_KEY_ENV)
}

pub fn model_id() -> String {
    non_empty_env(MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

pub fn demo_image_url() -> String {
    non_empty_env(DEMO_IMAGE_URL_ENV).unwrap_or_else(|| DEFAULT_DEMO_IMAGE_URL.to_string())
}

pub fn status() -> ConfigStatus {
    let key = gemini_api_key();
    ConfigStatus {
        has_api_key: key.is_some(),
        api_key_masked: key.as_deref().map(mask_api_key),
        model: model_id(),
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn mask_api_key(api_key: &str) -> String {
    if api_key.len() <= 10 {
        return "******".to_string();
    }

    let prefix = &api_key[..6];
    let suffix = &api_key[api_key.len().saturating_sub(4)..];
    format!("{}********{}", prefix, suffix)
}
