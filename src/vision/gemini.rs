// src/vision/gemini.rs — Gemini multimodal vision adapter

use super::VisionAdapter;
use crate::vision::types::{ImagePayload, TranscriptionError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const TEMPERATURE: f32 = 0.1;

const SYSTEM_INSTRUCTION: &str = "\
You are an expert paleographer and historian specializing in 16th and 17th-century Spanish colonial manuscripts, specifically those found in the Archivo General de Indias.

Your task is to transcribe the provided image exactly as it is written.
1. Preserve archaic spelling (e.g., \"vuestra merced\", \"tierra\", archaic abbreviations).
2. If a word is abbreviated in the manuscript (e.g., \"dho\" for \"dicho\", \"V.M.\" for \"Vuestra Merced\"), expand it in brackets like this: d[ich]o, V[uestra] M[erced], or keep it as is if commonly understood.
3. Maintain line breaks where possible to match the image structure.
4. If a word is illegible, mark it as [illegible].
5. Do not add conversational filler. Output only the transcription.
6. If the image is not a document, state that you cannot transcribe it.";

const USER_PROMPT: &str =
    "Transcribe this historical Spanish manuscript text found in the Archivo de Indias.";

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn inline_image(image: &ImagePayload) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            }),
        }
    }
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

pub struct GeminiVisionAdapter {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiVisionAdapter {
    pub fn new(api_key: String, model: String) -> Self {
        // No explicit timeout; the transport's own defaults apply.
        let client = Client::new();

        tracing::info!("Gemini vision adapter initialized (model {})", model);

        Self {
            client,
            api_key,
            model,
        }
    }

    fn build_request(image: &ImagePayload) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::inline_image(image), Part::text(USER_PROMPT)],
            }],
            system_instruction: Content {
                parts: vec![Part::text(SYSTEM_INSTRUCTION)],
            },
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        }
    }

    /// Joins the text parts of the first candidate. A whitespace-only or
    /// absent result counts as no transcription.
    fn extract_text(response: GenerateResponse) -> Option<String> {
        let content = response.candidates.into_iter().next()?.content?;
        let text = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[async_trait]
impl VisionAdapter for GeminiVisionAdapter {
    async fn transcribe(&self, image: &ImagePayload) -> Result<String, TranscriptionError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let request = Self::build_request(image);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TranscriptionError::NetworkError(format!("Gemini: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::InvalidResponse(format!("Gemini parse: {}", e)))?;

        Self::extract_text(parsed).ok_or(TranscriptionError::EmptyTranscription)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image() -> ImagePayload {
        ImagePayload::new("image/jpeg", "aGVsbG8=")
    }

    #[test]
    fn test_request_carries_inline_image_and_temperature() {
        let request = GeminiVisionAdapter::build_request(&sample_image());
        let json = serde_json::to_value(&request).expect("request serializes");

        let inline = &json["contents"][0]["parts"][0]["inlineData"];
        assert_eq!(inline["mimeType"], "image/jpeg");
        assert_eq!(inline["data"], "aGVsbG8=");

        let prompt = json["contents"][0]["parts"][1]["text"]
            .as_str()
            .expect("text part present");
        assert!(prompt.contains("Archivo de Indias"));

        assert_eq!(json["generationConfig"]["temperature"], 0.1);
    }

    #[test]
    fn test_request_carries_system_instruction() {
        let request = GeminiVisionAdapter::build_request(&sample_image());
        let json = serde_json::to_value(&request).expect("request serializes");

        let instruction = json["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .expect("system instruction present");
        assert!(instruction.contains("paleographer"));
        assert!(instruction.contains("[illegible]"));
    }

    #[test]
    fn test_extract_text_joins_candidate_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    {
                        "content": {
                            "parts": [
                                {"text": "En el nombre de "},
                                {"text": "su mag[esta]d"}
                            ]
                        }
                    }
                ]
            }"#,
        )
        .expect("response parses");

        assert_eq!(
            GeminiVisionAdapter::extract_text(response),
            Some("En el nombre de su mag[esta]d".to_string())
        );
    }

    #[test]
    fn test_extract_text_rejects_empty_results() {
        let no_candidates: GenerateResponse =
            serde_json::from_str(r#"{"candidates": []}"#).expect("parses");
        assert_eq!(GeminiVisionAdapter::extract_text(no_candidates), None);

        let blank: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "   "}]}}]}"#,
        )
        .expect("parses");
        assert_eq!(GeminiVisionAdapter::extract_text(blank), None);
    }
}
