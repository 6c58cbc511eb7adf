use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GeminiConfig;
use crate::error::{ModelError, ModelResult};

/// Backend-agnostic text generation.
///
/// Implemented by the Gemini HTTP client; tests substitute scripted backends.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Send `prompt` to `model` and return the raw response text.
    async fn generate(&self, model: &str, prompt: &str) -> ModelResult<String>;

    /// Whether a credential is available. Unconfigured backends are never called.
    fn is_configured(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Gemini `generateContent` over HTTPS
#[derive(Clone)]
pub struct GeminiModel {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiModel {
    pub fn new(config: &GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build Gemini HTTP client ({}), using defaults without timeout", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    async fn generate(&self, model: &str, prompt: &str) -> ModelResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ModelError::ServiceUnavailable("no API key configured".to_string()))?;

        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        tracing::debug!("Gemini request: model={} prompt_chars={}", model, prompt.len());

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::ServiceUnavailable(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: GenerateContentResponse = response.json().await?;
        extract_text(body)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn backend_name(&self) -> &'static str {
        "gemini"
    }
}

/// Text of the first candidate's first non-empty part
fn extract_text(response: GenerateContentResponse) -> ModelResult<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ModelError::InvalidResponse("no candidates in response".to_string()))?;

    candidate
        .content
        .into_iter()
        .flat_map(|content| content.parts)
        .filter_map(|part| part.text)
        .find(|text| !text.trim().is_empty())
        .ok_or_else(|| ModelError::InvalidResponse("candidate has no text".to_string()))
}
