/// Gemini-backed answer generator.
use super::{AnswerGenerator, GenerationParams};
use crate::gemini::{GeminiClient, ProviderError};

/// Generates answers through the Gemini text generation API.
pub struct GeminiGenerator {
    client: GeminiClient,
    model: String,
}

impl GeminiGenerator {
    /// Create a new generator for the given model identifier.
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

impl AnswerGenerator for GeminiGenerator {
    fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String, ProviderError> {
        self.client
            .generate(&self.model, prompt, params.temperature, params.max_tokens)
    }
}
