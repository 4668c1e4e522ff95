//! Blocking client for the Gemini REST API.
//!
//! Covers the two external service boundaries of the pipeline: text
//! embedding (`embedContent` / `batchEmbedContents`) and answer generation
//! (`generateContent`). Request and response shapes follow the v1beta API.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Errors from the embedding / generation service.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("empty response from model")]
    EmptyResponse,
}

/// Client for the Gemini API (embeddings and text generation).
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(GeminiClient {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        })
    }

    /// Override the API base URL (used by tests against a local server).
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        // Model identifiers may or may not carry the "models/" prefix
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        format!(
            "{}/{}:{}?key={}",
            self.base_url, model_path, method, self.api_key
        )
    }

    fn check_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .unwrap_or_else(|_| "unknown error".to_string());
        Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Embed a batch of document texts.
    pub fn embed_batch(&self, model: &str, texts: &[&str]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };

        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: model_path.clone(),
                    content: Content::user_text(text),
                    task_type: "RETRIEVAL_DOCUMENT",
                })
                .collect(),
        };

        debug!(count = texts.len(), "embedding document batch");

        let url = self.endpoint(model, "batchEmbedContents");
        let response = self.client.post(&url).json(&request).send()?;
        let response = Self::check_status(response)?;

        let data: BatchEmbedResponse = response.json()?;
        if data.embeddings.len() != texts.len() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(data.embeddings.into_iter().map(|e| e.values).collect())
    }

    /// Embed a single query text (retrieval-query task hint).
    pub fn embed_query(&self, model: &str, text: &str) -> Result<Vec<f32>, ProviderError> {
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };

        let request = EmbedContentRequest {
            model: model_path,
            content: Content::user_text(text),
            task_type: "RETRIEVAL_QUERY",
        };

        let url = self.endpoint(model, "embedContent");
        let response = self.client.post(&url).json(&request).send()?;
        let response = Self::check_status(response)?;

        let data: EmbedContentResponse = response.json()?;
        Ok(data.embedding.values)
    }

    /// Generate text for a prompt with the given sampling settings.
    pub fn generate(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<String, ProviderError> {
        let request = GenerateRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens,
            },
        };

        let url = self.endpoint(model, "generateContent");
        let response = self.client.post(&url).json(&request).send()?;
        let response = Self::check_status(response)?;

        let data: GenerateResponse = response.json()?;
        data.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or(ProviderError::EmptyResponse)
    }
}

// Wire types for the Gemini v1beta API (camelCase on the wire)

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
    role: &'static str,
}

impl Content {
    fn user_text(text: &str) -> Self {
        Content {
            parts: vec![Part {
                text: text.to_string(),
            }],
            role: "user",
        }
    }
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest {
    model: String,
    content: Content,
    task_type: &'static str,
}

#[derive(Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedContentRequest>,
}

#[derive(Deserialize, Debug)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Deserialize, Debug)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize, Debug)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize, Debug)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: String,
}
