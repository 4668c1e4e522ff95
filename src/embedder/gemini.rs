/// Gemini-backed embedder.
use super::Embedder;
use crate::gemini::{GeminiClient, ProviderError};

/// Embeds text through the Gemini embeddings API.
pub struct GeminiEmbedder {
    client: GeminiClient,
    model: String,
    dimensions: usize,
}

impl GeminiEmbedder {
    /// Create a new embedder for the given model identifier.
    pub fn new(client: GeminiClient, model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            client,
            model: model.into(),
            dimensions,
        }
    }
}

impl Embedder for GeminiEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.client.embed_batch(&self.model, texts)
    }

    fn embed_query(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.client.embed_query(&self.model, text)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
