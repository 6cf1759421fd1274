//! Gemini `generateContent` client
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::Engine;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

/// Substituted for the model reply whenever generation fails
pub const FALLBACK_MESSAGE: &str = "An error occurred. Please try again.";
/// Substituted for the regenerated reply after an edit when generation fails
pub const REGENERATE_FALLBACK_MESSAGE: &str = "An error occurred while regenerating the response.";

/// Inline image sent alongside a prompt
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePart {
    pub mime_type: String,
    /// Base64 payload without the `data:` prefix
    pub data: String,
}

impl ImagePart {
    /// Read an image file and encode it for upload
    pub async fn from_file(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;

        let mime = mime_guess::from_path(path).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(anyhow!("{} is not an image ({})", path.display(), mime));
        }

        Ok(Self {
            mime_type: mime.essence_str().to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        })
    }

    /// `data:` URL stored in the chat history for display and export
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Single outbound text/vision generation call
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, image: Option<&ImagePart>) -> Result<String>;
}

/// Call the generator, replacing any failure with `fallback`
pub async fn generate_or_fallback(
    generator: &dyn ContentGenerator,
    prompt: &str,
    image: Option<&ImagePart>,
    fallback: &str,
) -> String {
    match generator.generate(prompt, image).await {
        Ok(text) => text,
        Err(e) => {
            error!("Content generation failed: {e:#}");
            fallback.to_string()
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
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
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        GeminiClient {
            http: reqwest::Client::new(),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request<'a>(prompt: &'a str, image: Option<&'a ImagePart>) -> GenerateRequest<'a> {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = image {
            parts.push(RequestPart::Inline {
                inline_data: InlineData {
                    mime_type: &image.mime_type,
                    data: &image.data,
                },
            });
        }
        parts.push(RequestPart::Text { text: prompt });
        GenerateRequest {
            contents: vec![RequestContent { parts }],
        }
    }

    fn extract_text(response: GenerateResponse) -> Result<String> {
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            Err(anyhow!("Gemini returned no text candidates"))
        } else {
            Ok(text)
        }
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, image: Option<&ImagePart>) -> Result<String> {
        let request_id = Uuid::new_v4();
        let start_time = Instant::now();
        debug!(
            "[{request_id}] Calling {} | Prompt: {} chars | Image: {}",
            self.model,
            prompt.len(),
            image.map(|i| i.mime_type.as_str()).unwrap_or("none")
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::build_request(prompt, image))
            .send()
            .await
            .map_err(|e| anyhow!("Gemini request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("[{request_id}] Gemini API error {status}: {body}");
            return Err(anyhow!("Gemini API error: {}", status));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Unexpected Gemini response format: {}", e))?;
        let text = Self::extract_text(parsed)?;

        info!(
            "[{request_id}] Gemini response received | Time: {:?} | Length: {}",
            start_time.elapsed(),
            text.len()
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::generator::testing::ScriptedGenerator;

    #[test]
    fn test_request_body_text_only() {
        let body = serde_json::to_value(GeminiClient::build_request("hello", None)).unwrap();
        assert_eq!(body, serde_json::json!({"contents": [{"parts": [{"text": "hello"}]}]}));
    }

    #[test]
    fn test_request_body_with_image_first() {
        let image = ImagePart {
            mime_type: "image/jpeg".into(),
            data: "QUJD".into(),
        };
        let body = serde_json::to_value(GeminiClient::build_request("identify", Some(&image))).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "QUJD");
        assert_eq!(parts[1]["text"], "identify");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello "},{"text":"there"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(GeminiClient::extract_text(response).unwrap(), "Hello there");
    }

    #[test]
    fn test_extract_text_empty_is_error() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(GeminiClient::extract_text(response).is_err());

        let response: GenerateResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(GeminiClient::extract_text(response).is_err());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GeminiClient::new("k".into(), "gemini-2.5-flash".into(), "http://localhost:1/".into());
        assert_eq!(
            client.endpoint(),
            "http://localhost:1/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_data_url() {
        let image = ImagePart {
            mime_type: "image/png".into(),
            data: "AAAA".into(),
        };
        assert_eq!(image.data_url(), "data:image/png;base64,AAAA");
    }

    #[tokio::test]
    async fn test_image_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.png");
        std::fs::write(&path, b"ABC").unwrap();

        let image = ImagePart::from_file(&path).await.unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "QUJD");
    }

    #[tokio::test]
    async fn test_non_image_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        assert!(ImagePart::from_file(&path).await.is_err());
        assert!(ImagePart::from_file(&dir.path().join("missing.png")).await.is_err());
    }

    #[tokio::test]
    async fn test_fallback_on_failure() {
        let generator = ScriptedGenerator::new();
        generator.push_err("boom");
        generator.push_ok("fine");

        let first = generate_or_fallback(&generator, "p", None, FALLBACK_MESSAGE).await;
        let second = generate_or_fallback(&generator, "p", None, FALLBACK_MESSAGE).await;
        assert_eq!(first, FALLBACK_MESSAGE);
        assert_eq!(second, "fine");
    }
}
